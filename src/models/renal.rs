use super::{format_value, round_to, CalculationResult, Gender, Race};
use crate::error::{CalcError, CalcResult};

const GLUCOSE_MG_PER_MOSM: f64 = 18.0;

pub fn effective_osmolarity(sodium: f64, glucose: f64) -> CalculationResult {
    let osmolarity = 2.0 * sodium + glucose / GLUCOSE_MG_PER_MOSM;

    let interpretation = if osmolarity < 280.0 {
        "Hipoosmolar"
    } else if osmolarity > 295.0 {
        "Hiperosmolar"
    } else {
        "Normal"
    };

    CalculationResult {
        result: round_to(osmolarity, 1),
        unit: "mOsm/kg".to_string(),
        formula: "Osmolaridad efectiva = 2 × Na+ + (Glucosa / 18)".to_string(),
        explanation: format!(
            "Para Na+ {} mEq/L y glucosa {} mg/dL: {:.1} mOsm/kg",
            format_value(sodium), format_value(glucose), osmolarity
        ),
        interpretation: Some(interpretation.to_string()),
    }
}

/// Piecewise CKD-EPI coefficients: (scale, kappa, alpha below kappa).
fn ckd_epi_coefficients(gender: Gender) -> (f64, f64, f64) {
    match gender {
        Gender::Female => (144.0, 0.7, -0.329),
        Gender::Male => (141.0, 0.9, -0.411),
    }
}

/// Estimated GFR by CKD-EPI. Age is taken in whole years.
pub fn gfr_ckd_epi(
    creatinine: f64,
    age: f64,
    gender: Gender,
    race: Race,
) -> CalcResult<CalculationResult> {
    if creatinine <= 0.0 {
        return Err(CalcError::Domain(
            "La creatinina debe ser mayor que cero".to_string()
        ));
    }
    let age = age.trunc();

    let (scale, kappa, alpha) = ckd_epi_coefficients(gender);
    let exponent = if creatinine <= kappa { alpha } else { -1.209 };
    let mut gfr = scale * (creatinine / kappa).powf(exponent) * 0.993f64.powf(age);

    if race == Race::Black {
        gfr *= 1.159;
    }

    let interpretation = if gfr >= 90.0 {
        "Normal"
    } else if gfr >= 60.0 {
        "Leve disminución"
    } else if gfr >= 30.0 {
        "Moderada disminución"
    } else {
        "Severa disminución"
    };
    let rounded = round_to(gfr, 0);

    Ok(CalculationResult {
        result: rounded,
        unit: "mL/min/1.73m²".to_string(),
        formula: "CKD-EPI: GFR = 141 × min(Scr/κ,1)^α × max(Scr/κ,1)^-1.209 × 0.993^edad \
                  × [1.018 si mujer] × [1.159 si afroamericano]".to_string(),
        explanation: format!(
            "Para creatinina {} mg/dL, {}, {} años: TFG {} mL/min/1.73m²",
            format_value(creatinine), gender, age, rounded
        ),
        interpretation: Some(interpretation.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_osmolarity_bands() {
        let normal = effective_osmolarity(140.0, 100.0);
        assert_relative_eq!(normal.result, 285.6, epsilon = 1e-9);
        assert_eq!(normal.interpretation.as_deref(), Some("Normal"));
        assert_eq!(
            normal.explanation,
            "Para Na+ 140 mEq/L y glucosa 100 mg/dL: 285.6 mOsm/kg"
        );

        assert_eq!(effective_osmolarity(130.0, 90.0).interpretation.as_deref(), Some("Hipoosmolar"));
        assert_eq!(effective_osmolarity(145.0, 300.0).interpretation.as_deref(), Some("Hiperosmolar"));
    }

    #[test]
    fn test_gfr_female_above_kappa() {
        let result = gfr_ckd_epi(1.2, 65.0, Gender::Female, Race::Other).unwrap();
        assert_eq!(result.result, 48.0);
        assert_eq!(result.interpretation.as_deref(), Some("Moderada disminución"));
        assert_eq!(
            result.explanation,
            "Para creatinina 1.2 mg/dL, mujer, 65 años: TFG 48 mL/min/1.73m²"
        );
    }

    #[test]
    fn test_gfr_male_branches() {
        let low = gfr_ckd_epi(0.8, 40.0, Gender::Male, Race::Other).unwrap();
        assert_eq!(low.result, 112.0);
        assert_eq!(low.interpretation.as_deref(), Some("Normal"));

        let high = gfr_ckd_epi(1.0, 50.0, Gender::Male, Race::Other).unwrap();
        assert_eq!(high.result, 87.0);
        assert_eq!(high.interpretation.as_deref(), Some("Leve disminución"));
    }

    #[test]
    fn test_gfr_race_coefficient() {
        let other = gfr_ckd_epi(1.0, 50.0, Gender::Male, Race::Other).unwrap();
        let black = gfr_ckd_epi(1.0, 50.0, Gender::Male, Race::Black).unwrap();
        assert!(black.result > other.result);
        assert_eq!(black.result, 101.0);
    }

    #[test]
    fn test_gfr_truncates_age() {
        let whole = gfr_ckd_epi(1.2, 65.0, Gender::Female, Race::Other).unwrap();
        let fractional = gfr_ckd_epi(1.2, 65.9, Gender::Female, Race::Other).unwrap();
        assert_eq!(whole, fractional);
    }

    #[test]
    fn test_gfr_female_below_kappa() {
        // 144 × (0.6 / 0.7)^-0.329 × 0.993^40 ≈ 114.4
        let result = gfr_ckd_epi(0.6, 40.0, Gender::Female, Race::Other).unwrap();
        assert_eq!(result.result, 114.0);
        assert_eq!(result.interpretation.as_deref(), Some("Normal"));
    }

    #[test]
    fn test_gfr_severe_and_invalid() {
        let severe = gfr_ckd_epi(4.0, 70.0, Gender::Male, Race::Other).unwrap();
        assert_eq!(severe.interpretation.as_deref(), Some("Severa disminución"));
        assert!(gfr_ckd_epi(0.0, 70.0, Gender::Male, Race::Other).unwrap_err().is_domain());
    }
}
