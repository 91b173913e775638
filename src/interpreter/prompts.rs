use crate::models::{CalculationType, Param};
use log::debug;

const PARAM_PHRASES: &[(&str, &str)] = &[
    ("height", "la altura del paciente en metros o centímetros"),
    ("gender", "el género del paciente (hombre o mujer)"),
    ("bicarbonate", "el bicarbonato en mEq/L"),
    ("sodium", "el sodio en mEq/L"),
    ("chloride", "el cloro en mEq/L"),
    ("glucose", "la glucosa en mg/dL"),
    ("creatinine", "la creatinina en mg/dL"),
    ("age", "la edad en años"),
    ("currentCO2", "el CO2 actual en mmHg"),
    ("targetCO2", "el CO2 objetivo en mmHg"),
    ("currentFrequency", "la frecuencia respiratoria actual"),
    ("race", "la raza del paciente"),
];

/// Human-readable phrase for a parameter key; unknown keys are returned as is.
pub fn phrase_for(key: &str) -> &str {
    PARAM_PHRASES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, phrase)| *phrase)
        .unwrap_or(key)
}

pub fn prompt_for(calculation: CalculationType, missing: &[Param]) -> String {
    debug!("Prompting for {} parameter(s) of {}", missing.len(), calculation);
    prompt_for_keys(missing.iter().map(|p| p.key()))
}

pub fn prompt_for_keys<'a, I>(keys: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let phrases: Vec<&str> = keys.into_iter().map(phrase_for).collect();
    match phrases.as_slice() {
        [] => String::new(),
        [only] => format!("Por favor, dime {}.", only),
        _ => format!(
            "Necesito los siguientes valores: {}. Dime el primero.",
            phrases.join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_missing_parameter() {
        assert_eq!(
            prompt_for(CalculationType::Winter, &[Param::Bicarbonate]),
            "Por favor, dime el bicarbonato en mEq/L."
        );
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let first = prompt_for(CalculationType::Winter, &[Param::Bicarbonate]);
        let second = prompt_for(CalculationType::Winter, &[Param::Bicarbonate]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_multiple_missing_parameters() {
        assert_eq!(
            prompt_for(CalculationType::EffectiveOsmolarity, &[Param::Sodium, Param::Glucose]),
            "Necesito los siguientes valores: el sodio en mEq/L, la glucosa en mg/dL. Dime el primero."
        );
    }

    #[test]
    fn test_gender_prompt_mentions_gender() {
        let prompt = prompt_for(CalculationType::Gfr, &[Param::Gender]);
        assert!(prompt.contains("género"));
    }

    #[test]
    fn test_unknown_key_falls_back_to_raw_name() {
        assert_eq!(phrase_for("hemoglobin"), "hemoglobin");
        assert_eq!(prompt_for_keys(["hemoglobin"]), "Por favor, dime hemoglobin.");
    }
}
