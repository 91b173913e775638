use super::{format_value, round_to, CalculationResult};
use crate::error::{CalcError, CalcResult};

/// Expected PaCO2 in metabolic acidosis (Winter).
pub fn winter_formula(bicarbonate: f64) -> CalculationResult {
    let expected_co2 = 1.5 * bicarbonate + 8.0;
    compensation_result(
        bicarbonate,
        expected_co2,
        2.0,
        "CO2 esperado = 1.5 × HCO3- + 8 (±2)",
        "Compensación respiratoria esperada en acidosis metabólica",
    )
}

/// Expected PaCO2 in metabolic alkalosis.
pub fn alkalosis_compensation(bicarbonate: f64) -> CalculationResult {
    let expected_co2 = 0.7 * bicarbonate + 21.0;
    compensation_result(
        bicarbonate,
        expected_co2,
        1.5,
        "CO2 esperado = 0.7 × HCO3- + 21 (±1.5)",
        "Compensación respiratoria esperada en alcalosis metabólica",
    )
}

fn compensation_result(
    bicarbonate: f64,
    expected_co2: f64,
    tolerance: f64,
    formula: &str,
    interpretation: &str,
) -> CalculationResult {
    let lower = expected_co2 - tolerance;
    let upper = expected_co2 + tolerance;

    CalculationResult {
        result: round_to(expected_co2, 1),
        unit: "mmHg".to_string(),
        formula: formula.to_string(),
        explanation: format!(
            "Para HCO3- de {} mEq/L: CO2 esperado {:.1} mmHg (rango: {:.1}-{:.1})",
            format_value(bicarbonate), expected_co2, lower, upper
        ),
        interpretation: Some(interpretation.to_string()),
    }
}

/// Ventilator rate needed to move PaCO2 from `current_co2` to `target_co2`.
pub fn respiratory_rate(
    current_co2: f64,
    target_co2: f64,
    current_rr: f64,
) -> CalcResult<CalculationResult> {
    if target_co2 <= 0.0 {
        return Err(CalcError::Domain(
            "El CO2 objetivo debe ser mayor que cero".to_string()
        ));
    }

    let new_rr = round_to(current_rr * (current_co2 / target_co2), 0);

    Ok(CalculationResult {
        result: new_rr,
        unit: "rpm".to_string(),
        formula: "FR nueva = FR actual × (CO2 actual / CO2 objetivo)".to_string(),
        explanation: format!(
            "Para cambiar CO2 de {} a {} mmHg con FR actual {} rpm: nueva FR {} rpm",
            format_value(current_co2), format_value(target_co2), format_value(current_rr), new_rr
        ),
        interpretation: Some(
            "Ajuste de frecuencia respiratoria para alcanzar CO2 objetivo".to_string()
        ),
    })
}

const SODIUM_RANGE: (f64, f64) = (120.0, 160.0);
const CHLORIDE_RANGE: (f64, f64) = (80.0, 120.0);
const BICARBONATE_RANGE: (f64, f64) = (5.0, 35.0);

fn check_range(value: f64, (min, max): (f64, f64), name: &str) -> CalcResult<()> {
    if value < min || value > max {
        return Err(CalcError::Domain(format!(
            "El {} debe estar entre {} y {} mEq/L", name, min, max
        )));
    }
    Ok(())
}

/// Serum anion gap, Na - (Cl + HCO3).
pub fn anion_gap(sodium: f64, chloride: f64, bicarbonate: f64) -> CalcResult<CalculationResult> {
    check_range(sodium, SODIUM_RANGE, "sodio")?;
    check_range(chloride, CHLORIDE_RANGE, "cloro")?;
    check_range(bicarbonate, BICARBONATE_RANGE, "bicarbonato")?;

    let gap = sodium - (chloride + bicarbonate);

    let interpretation = if gap < 8.0 {
        "Anion gap bajo"
    } else if gap <= 12.0 {
        "Anion gap normal"
    } else {
        "Anion gap elevado"
    };

    let rounded = round_to(gap, 1);

    Ok(CalculationResult {
        result: rounded,
        unit: "mEq/L".to_string(),
        formula: "Anion Gap = Na⁺ - (Cl⁻ + HCO₃⁻)".to_string(),
        explanation: format!(
            "Anion Gap = {} - ({} + {}) = {:.1} mEq/L",
            format_value(sodium), format_value(chloride), format_value(bicarbonate), rounded
        ),
        interpretation: Some(interpretation.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_winter_formula() {
        let result = winter_formula(15.0);
        assert_relative_eq!(result.result, 30.5, epsilon = 1e-9);
        assert_eq!(result.unit, "mmHg");
        assert_eq!(
            result.explanation,
            "Para HCO3- de 15 mEq/L: CO2 esperado 30.5 mmHg (rango: 28.5-32.5)"
        );
    }

    #[test]
    fn test_alkalosis_compensation() {
        let result = alkalosis_compensation(30.0);
        assert_relative_eq!(result.result, 42.0, epsilon = 1e-9);
        assert!(result.explanation.ends_with("(rango: 40.5-43.5)"));
    }

    #[test]
    fn test_respiratory_rate() {
        let result = respiratory_rate(50.0, 40.0, 16.0).unwrap();
        assert_eq!(result.result, 20.0);
        assert_eq!(result.unit, "rpm");
        assert_eq!(
            result.explanation,
            "Para cambiar CO2 de 50 a 40 mmHg con FR actual 16 rpm: nueva FR 20 rpm"
        );
    }

    #[test]
    fn test_respiratory_rate_rejects_zero_target() {
        assert!(respiratory_rate(50.0, 0.0, 16.0).unwrap_err().is_domain());
    }

    #[test]
    fn test_anion_gap_elevated() {
        let result = anion_gap(140.0, 100.0, 24.0).unwrap();
        assert_relative_eq!(result.result, 16.0, epsilon = 1e-9);
        assert_eq!(result.interpretation.as_deref(), Some("Anion gap elevado"));
        assert_eq!(result.explanation, "Anion Gap = 140 - (100 + 24) = 16.0 mEq/L");
    }

    #[test]
    fn test_anion_gap_bands() {
        assert_eq!(
            anion_gap(140.0, 104.0, 24.0).unwrap().interpretation.as_deref(),
            Some("Anion gap normal")
        );
        assert_eq!(
            anion_gap(135.0, 105.0, 24.0).unwrap().interpretation.as_deref(),
            Some("Anion gap bajo")
        );
        assert_eq!(
            anion_gap(140.0, 108.0, 24.0).unwrap().interpretation.as_deref(),
            Some("Anion gap normal")
        );
    }

    #[test]
    fn test_anion_gap_out_of_range() {
        let err = anion_gap(170.0, 100.0, 24.0).unwrap_err();
        assert!(err.is_domain());
        assert_eq!(err.to_string(), "El sodio debe estar entre 120 y 160 mEq/L");

        assert!(anion_gap(140.0, 70.0, 24.0).unwrap_err().is_domain());
        assert!(anion_gap(140.0, 100.0, 40.0).unwrap_err().is_domain());
    }

    #[test]
    fn test_anion_gap_negative_tie_rounds_up() {
        let result = anion_gap(120.0, 100.25, 24.5).unwrap();
        assert_relative_eq!(result.result, -4.7, epsilon = 1e-9);
        assert_eq!(result.explanation, "Anion Gap = 120 - (100.25 + 24.5) = -4.7 mEq/L");
        assert_eq!(result.interpretation.as_deref(), Some("Anion gap bajo"));
    }
}
