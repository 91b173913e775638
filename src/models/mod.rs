pub mod anthropometry;
pub mod acid_base;
pub mod renal;

use crate::config::CalculatorOptions;
use crate::error::{CalcError, CalcResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The closed set of clinical calculations the interpreter can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationType {
    IdealWeight,
    PredictedWeight,
    Winter,
    AlkalosisCompensation,
    EffectiveOsmolarity,
    RespiratoryRate,
    Gfr,
    AnionGap,
}

impl CalculationType {
    pub const ALL: [CalculationType; 8] = [
        CalculationType::IdealWeight,
        CalculationType::PredictedWeight,
        CalculationType::Winter,
        CalculationType::AlkalosisCompensation,
        CalculationType::EffectiveOsmolarity,
        CalculationType::RespiratoryRate,
        CalculationType::Gfr,
        CalculationType::AnionGap,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CalculationType::IdealWeight => "ideal_weight",
            CalculationType::PredictedWeight => "predicted_weight",
            CalculationType::Winter => "winter",
            CalculationType::AlkalosisCompensation => "alkalosis_compensation",
            CalculationType::EffectiveOsmolarity => "effective_osmolarity",
            CalculationType::RespiratoryRate => "respiratory_rate",
            CalculationType::Gfr => "tfg",
            CalculationType::AnionGap => "anion_gap",
        }
    }

    /// Spoken name used when listing the supported calculations.
    pub fn display_name(self) -> &'static str {
        match self {
            CalculationType::IdealWeight => "peso ideal",
            CalculationType::PredictedWeight => "peso predicho",
            CalculationType::Winter => "fórmula de Winter",
            CalculationType::AlkalosisCompensation => "CO2 para alcalosis metabólica",
            CalculationType::EffectiveOsmolarity => "osmolaridad efectiva",
            CalculationType::RespiratoryRate => "frecuencia respiratoria",
            CalculationType::Gfr => "filtrado glomerular CKD-EPI",
            CalculationType::AnionGap => "anion gap",
        }
    }

    /// Required parameters in positional order. Numbers found in a
    /// transcript fill the numeric entries of this list left to right.
    pub fn required_params(self) -> &'static [Param] {
        match self {
            CalculationType::IdealWeight | CalculationType::PredictedWeight => {
                &[Param::Height, Param::Gender]
            },
            CalculationType::Winter | CalculationType::AlkalosisCompensation => {
                &[Param::Bicarbonate]
            },
            CalculationType::EffectiveOsmolarity => &[Param::Sodium, Param::Glucose],
            CalculationType::RespiratoryRate => {
                &[Param::CurrentCO2, Param::TargetCO2, Param::CurrentFrequency]
            },
            CalculationType::Gfr => &[Param::Creatinine, Param::Age, Param::Gender],
            CalculationType::AnionGap => &[Param::Sodium, Param::Chloride, Param::Bicarbonate],
        }
    }

    /// Parameters that are used when present but never asked for.
    pub fn optional_params(self) -> &'static [Param] {
        match self {
            CalculationType::Gfr => &[Param::Race],
            _ => &[],
        }
    }

    pub fn numeric_slots(self) -> impl Iterator<Item = Param> {
        self.required_params()
            .iter()
            .copied()
            .filter(|p| p.kind() == ParamKind::Number)
    }
}

impl fmt::Display for CalculationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Param {
    #[serde(rename = "height")]
    Height,
    #[serde(rename = "gender")]
    Gender,
    #[serde(rename = "bicarbonate")]
    Bicarbonate,
    #[serde(rename = "sodium")]
    Sodium,
    #[serde(rename = "chloride")]
    Chloride,
    #[serde(rename = "glucose")]
    Glucose,
    #[serde(rename = "creatinine")]
    Creatinine,
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "currentCO2")]
    CurrentCO2,
    #[serde(rename = "targetCO2")]
    TargetCO2,
    #[serde(rename = "currentFrequency")]
    CurrentFrequency,
    #[serde(rename = "race")]
    Race,
}

impl Param {
    pub fn key(self) -> &'static str {
        match self {
            Param::Height => "height",
            Param::Gender => "gender",
            Param::Bicarbonate => "bicarbonate",
            Param::Sodium => "sodium",
            Param::Chloride => "chloride",
            Param::Glucose => "glucose",
            Param::Creatinine => "creatinine",
            Param::Age => "age",
            Param::CurrentCO2 => "currentCO2",
            Param::TargetCO2 => "targetCO2",
            Param::CurrentFrequency => "currentFrequency",
            Param::Race => "race",
        }
    }

    pub fn kind(self) -> ParamKind {
        match self {
            Param::Gender => ParamKind::Gender,
            Param::Race => ParamKind::Race,
            _ => ParamKind::Number,
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    Gender,
    Race,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("hombre"),
            Gender::Female => f.write_str("mujer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Race {
    Black,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Number(f64),
    Gender(Gender),
    Race(Race),
}

impl ParamValue {
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Number(_) => ParamKind::Number,
            ParamValue::Gender(_) => ParamKind::Gender,
            ParamValue::Race(_) => ParamKind::Race,
        }
    }
}

/// Collected parameter values keyed by name. Values are only ever added:
/// once a key holds a value of the right kind it is kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<Param, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` unless `param` is already filled. Returns whether the
    /// value was stored.
    pub fn fill(&mut self, param: Param, value: ParamValue) -> bool {
        if value.kind() != param.kind() || self.is_filled(param) {
            return false;
        }
        self.values.insert(param, value);
        true
    }

    pub fn is_filled(&self, param: Param) -> bool {
        self.values
            .get(&param)
            .map(|v| v.kind() == param.kind())
            .unwrap_or(false)
    }

    pub fn number(&self, param: Param) -> CalcResult<f64> {
        match self.values.get(&param) {
            Some(ParamValue::Number(n)) => Ok(*n),
            _ => Err(CalcError::MissingParameter(param.key().to_string())),
        }
    }

    pub fn gender(&self, param: Param) -> CalcResult<Gender> {
        match self.values.get(&param) {
            Some(ParamValue::Gender(g)) => Ok(*g),
            _ => Err(CalcError::MissingParameter(param.key().to_string())),
        }
    }

    pub fn race(&self) -> Race {
        match self.values.get(&Param::Race) {
            Some(ParamValue::Race(r)) => *r,
            _ => Race::Other,
        }
    }

    /// Required parameters of `calculation` that are still unfilled, in slot order.
    pub fn missing_for(&self, calculation: CalculationType) -> Vec<Param> {
        calculation
            .required_params()
            .iter()
            .copied()
            .filter(|p| !self.is_filled(*p))
            .collect()
    }

    pub fn is_complete_for(&self, calculation: CalculationType) -> bool {
        self.missing_for(calculation).is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub result: f64,
    pub unit: String,
    pub formula: String,
    pub explanation: String,
    pub interpretation: Option<String>,
}

/// Runs the formula for `calculation` on a complete parameter set.
pub fn calculate(
    calculation: CalculationType,
    params: &ParameterSet,
    options: &CalculatorOptions,
) -> CalcResult<CalculationResult> {
    let result = match calculation {
        CalculationType::IdealWeight => anthropometry::ideal_weight(
            params.number(Param::Height)?,
            params.gender(Param::Gender)?,
            options,
        )?,
        CalculationType::PredictedWeight => anthropometry::predicted_weight(
            params.number(Param::Height)?,
            params.gender(Param::Gender)?,
            options,
        )?,
        CalculationType::Winter => acid_base::winter_formula(
            params.number(Param::Bicarbonate)?,
        ),
        CalculationType::AlkalosisCompensation => acid_base::alkalosis_compensation(
            params.number(Param::Bicarbonate)?,
        ),
        CalculationType::EffectiveOsmolarity => renal::effective_osmolarity(
            params.number(Param::Sodium)?,
            params.number(Param::Glucose)?,
        ),
        CalculationType::RespiratoryRate => acid_base::respiratory_rate(
            params.number(Param::CurrentCO2)?,
            params.number(Param::TargetCO2)?,
            params.number(Param::CurrentFrequency)?,
        )?,
        CalculationType::Gfr => renal::gfr_ckd_epi(
            params.number(Param::Creatinine)?,
            params.number(Param::Age)?,
            params.gender(Param::Gender)?,
            params.race(),
        )?,
        CalculationType::AnionGap => acid_base::anion_gap(
            params.number(Param::Sodium)?,
            params.number(Param::Chloride)?,
            params.number(Param::Bicarbonate)?,
        )?,
    };

    if !result.result.is_finite() {
        return Err(CalcError::Computation(
            format!("{} produced a non-finite value", calculation)
        ));
    }

    Ok(result)
}

/// Rounds to `decimals` places with ties going up, so -4.75 becomes -4.7.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor + 0.5).floor() / factor
}

/// Formats an input value for explanations: at most two decimals, no
/// trailing zeros.
pub(crate) fn format_value(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(values: &[(Param, ParamValue)]) -> ParameterSet {
        let mut set = ParameterSet::new();
        for (p, v) in values {
            set.fill(*p, *v);
        }
        set
    }

    #[test]
    fn test_fill_is_monotonic() {
        let mut set = ParameterSet::new();
        assert!(set.fill(Param::Sodium, ParamValue::Number(140.0)));
        assert!(!set.fill(Param::Sodium, ParamValue::Number(150.0)));
        assert_eq!(set.number(Param::Sodium).unwrap(), 140.0);
    }

    #[test]
    fn test_fill_rejects_wrong_kind() {
        let mut set = ParameterSet::new();
        assert!(!set.fill(Param::Gender, ParamValue::Number(1.0)));
        assert!(!set.fill(Param::Age, ParamValue::Gender(Gender::Male)));
        assert!(set.is_empty());
    }

    #[test]
    fn test_missing_keeps_slot_order() {
        let set = params(&[(Param::Age, ParamValue::Number(65.0))]);
        assert_eq!(
            set.missing_for(CalculationType::Gfr),
            vec![Param::Creatinine, Param::Gender]
        );
        assert!(!set.is_complete_for(CalculationType::Gfr));
    }

    #[test]
    fn test_dispatch_osmolarity() {
        let set = params(&[
            (Param::Sodium, ParamValue::Number(140.0)),
            (Param::Glucose, ParamValue::Number(100.0)),
        ]);
        let result = calculate(
            CalculationType::EffectiveOsmolarity, &set, &CalculatorOptions::default()
        ).unwrap();
        assert_relative_eq!(result.result, 285.6, epsilon = 1e-9);
        assert_eq!(result.interpretation.as_deref(), Some("Normal"));
    }

    #[test]
    fn test_dispatch_is_pure() {
        let set = params(&[
            (Param::Creatinine, ParamValue::Number(1.2)),
            (Param::Age, ParamValue::Number(65.0)),
            (Param::Gender, ParamValue::Gender(Gender::Female)),
        ]);
        let options = CalculatorOptions::default();
        let first = calculate(CalculationType::Gfr, &set, &options).unwrap();
        let second = calculate(CalculationType::Gfr, &set, &options).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.result.to_bits(), second.result.to_bits());
    }

    #[test]
    fn test_dispatch_reports_missing_parameter() {
        let set = params(&[(Param::Sodium, ParamValue::Number(140.0))]);
        let err = calculate(
            CalculationType::EffectiveOsmolarity, &set, &CalculatorOptions::default()
        ).unwrap_err();
        assert!(matches!(err, CalcError::MissingParameter(ref p) if p == "glucose"));
    }

    #[test]
    fn test_parameter_set_serializes_with_camel_case_keys() {
        let set = params(&[
            (Param::CurrentCO2, ParamValue::Number(50.0)),
            (Param::Gender, ParamValue::Gender(Gender::Female)),
        ]);
        let json = serde_json::to_value(&set).unwrap();
        assert_eq!(json["currentCO2"], 50.0);
        assert_eq!(json["gender"], "female");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(140.0), "140");
        assert_eq!(format_value(1.2), "1.2");
        assert_eq!(format_value(1.74), "1.74");
        assert_eq!(format_value(0.126), "0.13");
        assert_eq!(format_value(100.0), "100");
    }

    #[test]
    fn test_round_to_breaks_ties_upward() {
        assert_relative_eq!(round_to(-4.75, 1), -4.7, epsilon = 1e-12);
        assert_relative_eq!(round_to(2.5, 0), 3.0, epsilon = 1e-12);
        assert_relative_eq!(round_to(-2.5, 0), -2.0, epsilon = 1e-12);
        assert_relative_eq!(round_to(68.157, 1), 68.2, epsilon = 1e-12);
    }
}
