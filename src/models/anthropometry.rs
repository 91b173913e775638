use super::{format_value, round_to, CalculationResult, Gender};
use crate::config::CalculatorOptions;
use crate::error::{CalcError, CalcResult};
use log::debug;

const BASE_HEIGHT_CM: f64 = 152.4; // 5 feet
const CM_PER_INCH: f64 = 2.54;

/// Unit a formula reports its height bounds in.
#[derive(Debug, Clone, Copy)]
enum RangeUnit {
    Meters,
    Centimeters,
}

impl RangeUnit {
    fn out_of_range(self, (min, max): (f64, f64)) -> CalcError {
        let message = match self {
            RangeUnit::Meters => {
                format!("La altura debe estar entre {:.1} y {:.1} metros", min, max)
            },
            RangeUnit::Centimeters => format!(
                "La altura debe estar entre {} y {} centímetros",
                format_value(min * 100.0),
                format_value(max * 100.0)
            ),
        };
        CalcError::Domain(message)
    }
}

/// Normalizes a spoken height to centimeters and applies the realistic-range
/// check when enabled.
fn height_in_cm(height: f64, options: &CalculatorOptions, unit: RangeUnit) -> CalcResult<f64> {
    let cm = options.height_unit.to_centimeters(height);

    if options.validate_ranges {
        let (min, max) = options.height_range_m;
        let meters = cm / 100.0;
        if meters < min || meters > max {
            return Err(unit.out_of_range((min, max)));
        }
    }

    Ok(cm)
}

fn inches_over_five_feet(cm: f64) -> f64 {
    (cm - BASE_HEIGHT_CM) / CM_PER_INCH
}

fn check_weight(weight: f64, options: &CalculatorOptions) -> CalcResult<()> {
    if options.validate_ranges && weight > options.max_weight_kg {
        return Err(CalcError::Domain(
            "Resultado poco realista. Verifica la altura ingresada.".to_string()
        ));
    }
    Ok(())
}

/// Robinson ideal body weight.
pub fn ideal_weight(
    height: f64,
    gender: Gender,
    options: &CalculatorOptions,
) -> CalcResult<CalculationResult> {
    let cm = height_in_cm(height, options, RangeUnit::Meters)?;
    let inches = inches_over_five_feet(cm);

    let weight = match gender {
        Gender::Male => 52.0 + 1.9 * inches,
        Gender::Female => 49.0 + 1.7 * inches,
    };
    check_weight(weight, options)?;
    debug!("Ideal weight for {} at {} cm: {}", gender, cm, weight);

    let formula = match gender {
        Gender::Male => "Peso ideal (hombre) = 52 + 1.9 × ((altura en cm - 152.4) / 2.54)",
        Gender::Female => "Peso ideal (mujer) = 49 + 1.7 × ((altura en cm - 152.4) / 2.54)",
    };

    Ok(CalculationResult {
        result: round_to(weight, 1),
        unit: "kg".to_string(),
        formula: formula.to_string(),
        explanation: format!(
            "Para {} de {}m: {:.1} kg", gender, format_value(cm / 100.0), weight
        ),
        interpretation: Some("Fórmula de Robinson para peso corporal ideal".to_string()),
    })
}

/// Predicted body weight (ARDSNet), used for ventilator tidal volumes.
pub fn predicted_weight(
    height: f64,
    gender: Gender,
    options: &CalculatorOptions,
) -> CalcResult<CalculationResult> {
    let cm = height_in_cm(height, options, RangeUnit::Centimeters)?;
    let inches = inches_over_five_feet(cm);

    let weight = match gender {
        Gender::Male => 50.0 + 2.3 * inches,
        Gender::Female => 45.5 + 2.3 * inches,
    };
    check_weight(weight, options)?;
    debug!("Predicted weight for {} at {} cm: {}", gender, cm, weight);

    let formula = match gender {
        Gender::Male => "Peso predicho (hombre) = 50 + 2.3 × ((altura en cm - 152.4) / 2.54)",
        Gender::Female => "Peso predicho (mujer) = 45.5 + 2.3 × ((altura en cm - 152.4) / 2.54)",
    };

    Ok(CalculationResult {
        result: round_to(weight, 1),
        unit: "kg".to_string(),
        formula: formula.to_string(),
        explanation: format!(
            "Para {} de {}cm: {:.1} kg", gender, format_value(cm), weight
        ),
        interpretation: Some("Peso corporal predicho para ventilación mecánica".to_string()),
    })
}
