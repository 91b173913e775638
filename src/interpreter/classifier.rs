use super::extractor::{extract_gender, extract_numbers, extract_race};
use crate::models::{CalculationType, Param, ParamValue, ParameterSet};
use log::debug;

/// Keyword sets in priority order. The first set with a phrase contained in
/// the transcript decides the calculation.
pub const KEYWORDS: &[(&[&str], CalculationType)] = &[
    (&["peso ideal"], CalculationType::IdealWeight),
    (&["peso predicho"], CalculationType::PredictedWeight),
    (&["winter", "acidosis metabólica", "acidosis metabolica"], CalculationType::Winter),
    (
        &["alcalosis metabólica", "alcalosis metabolica", "co2 esperado alcalosis"],
        CalculationType::AlkalosisCompensation,
    ),
    (&["osmolaridad"], CalculationType::EffectiveOsmolarity),
    (&["frecuencia respiratoria", "ajustar frecuencia"], CalculationType::RespiratoryRate),
    (&["filtrado glomerular", "tfg", "ckd"], CalculationType::Gfr),
    (
        &["anion gap", "anión gap", "brecha aniónica", "brecha anionica", "hiato aniónico"],
        CalculationType::AnionGap,
    ),
];

/// A classified transcript with whatever parameters it already carried.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialCommand {
    pub calculation: CalculationType,
    pub collected: ParameterSet,
}

pub fn detect_calculation(text: &str) -> Option<CalculationType> {
    KEYWORDS
        .iter()
        .find(|(phrases, _)| phrases.iter().any(|p| text.contains(p)))
        .map(|(_, calculation)| *calculation)
}

/// Classifies a normalized transcript and assigns its numbers positionally
/// to the calculation's numeric slots.
pub fn classify(text: &str) -> Option<PartialCommand> {
    let calculation = detect_calculation(text)?;
    let mut collected = ParameterSet::new();

    for (slot, value) in calculation.numeric_slots().zip(extract_numbers(text)) {
        collected.fill(slot, ParamValue::Number(value));
    }

    if calculation.required_params().contains(&Param::Gender) {
        if let Some(gender) = extract_gender(text) {
            collected.fill(Param::Gender, ParamValue::Gender(gender));
        }
    }
    if calculation.optional_params().contains(&Param::Race) {
        if let Some(race) = extract_race(text) {
            collected.fill(Param::Race, ParamValue::Race(race));
        }
    }

    debug!("Classified '{}' as {} with {} parameter(s)", text, calculation, collected.len());
    Some(PartialCommand { calculation, collected })
}
