//! Voice-command interpreter.
//!
//! A transcript is either a new command, which is classified and checked for
//! missing parameters, or an answer to an outstanding question, which only
//! fills the parameters still missing from the caller's [`PendingCommand`].
//! The interpreter holds no conversation state of its own.

pub mod classifier;
pub mod extractor;
pub mod prompts;

use crate::config::CalculatorOptions;
use crate::error::CalcError;
use crate::models::{
    calculate, CalculationResult, CalculationType, Param, ParamKind, ParamValue, ParameterSet,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

pub use classifier::{classify, PartialCommand};
pub use extractor::{extract_gender, extract_numbers, normalize};
pub use prompts::prompt_for;

pub const CALCULATION_FAILED: &str = "Error al ejecutar el cálculo. Inténtalo de nuevo.";

/// Message for transcripts that name no supported calculation.
pub fn unrecognized_message() -> String {
    let names: Vec<&str> = CalculationType::ALL.iter().map(|c| c.display_name()).collect();
    let (last, rest) = match names.split_last() {
        Some(split) => split,
        None => return "No reconocí el comando.".to_string(),
    };
    format!("No reconocí el comando. Puedo calcular: {} y {}.", rest.join(", "), last)
}

/// An in-progress calculation waiting for more parameters. Owned by the
/// caller between turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCommand {
    pub calculation: CalculationType,
    pub collected: ParameterSet,
    pub missing: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Completed(CalculationResult),
    NeedsMoreInfo {
        calculation: CalculationType,
        missing: Vec<Param>,
        collected: ParameterSet,
        prompt: String,
    },
    Failed { message: String },
}

impl Resolution {
    /// The state to hand back on the next turn, if a question is outstanding.
    pub fn pending(&self) -> Option<PendingCommand> {
        match self {
            Resolution::NeedsMoreInfo { calculation, missing, collected, .. } => {
                Some(PendingCommand {
                    calculation: *calculation,
                    collected: collected.clone(),
                    missing: missing.clone(),
                })
            },
            _ => None,
        }
    }

    /// Text for the speech-synthesis and display collaborators.
    pub fn message(&self) -> Option<&str> {
        match self {
            Resolution::NeedsMoreInfo { prompt, .. } => Some(prompt.as_str()),
            Resolution::Failed { message } => Some(message.as_str()),
            Resolution::Completed(_) => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Resolution::Completed(_))
    }

    fn failed(message: impl Into<String>) -> Self {
        Resolution::Failed { message: message.into() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Interpreter {
    options: CalculatorOptions,
}

impl Interpreter {
    pub fn new(options: CalculatorOptions) -> Self {
        Self { options }
    }

    /// Resolves one conversational turn. Every failure is returned as
    /// [`Resolution::Failed`].
    pub fn resolve(&self, transcript: &str, pending: Option<&PendingCommand>) -> Resolution {
        let text = normalize(transcript);

        match pending {
            None => {
                let command = match classify(&text) {
                    Some(command) => command,
                    None => {
                        info!("Unrecognized command: '{}'", text);
                        return Resolution::failed(unrecognized_message());
                    },
                };
                info!("Recognized {} command", command.calculation);
                self.complete_or_ask(command.calculation, command.collected)
            },
            Some(pending) => {
                let collected = merge_answer(pending, &text);
                self.complete_or_ask(pending.calculation, collected)
            },
        }
    }

    fn complete_or_ask(&self, calculation: CalculationType, collected: ParameterSet) -> Resolution {
        let missing = collected.missing_for(calculation);
        if !missing.is_empty() {
            debug!("{} still needs {:?}", calculation, missing);
            let prompt = prompt_for(calculation, &missing);
            return Resolution::NeedsMoreInfo { calculation, missing, collected, prompt };
        }

        match calculate(calculation, &collected, &self.options) {
            Ok(result) => {
                info!("{} = {} {}", calculation, result.result, result.unit);
                Resolution::Completed(result)
            },
            Err(CalcError::Domain(message)) => {
                info!("{} rejected its inputs: {}", calculation, message);
                Resolution::failed(message)
            },
            Err(e) => {
                warn!("{} failed: {}", calculation, e);
                Resolution::failed(CALCULATION_FAILED)
            },
        }
    }
}

/// Convenience entry point using the default calculator options.
pub fn resolve(transcript: &str, pending: Option<&PendingCommand>) -> Resolution {
    Interpreter::default().resolve(transcript, pending)
}

/// Treats `text` as an answer: fills still-missing slots only, never
/// overwriting collected values.
fn merge_answer(pending: &PendingCommand, text: &str) -> ParameterSet {
    let mut collected = pending.collected.clone();
    let still_missing: Vec<Param> = pending
        .missing
        .iter()
        .copied()
        .filter(|p| !collected.is_filled(*p))
        .collect();

    if still_missing.contains(&Param::Gender) {
        if let Some(gender) = extractor::extract_gender(text) {
            collected.fill(Param::Gender, ParamValue::Gender(gender));
        }
    }

    let numeric_slots = still_missing.iter().filter(|p| p.kind() == ParamKind::Number);
    for (slot, value) in numeric_slots.zip(extract_numbers(text)) {
        collected.fill(*slot, ParamValue::Number(value));
    }

    if pending.calculation.optional_params().contains(&Param::Race) {
        if let Some(race) = extractor::extract_race(text) {
            collected.fill(Param::Race, ParamValue::Race(race));
        }
    }

    debug!(
        "Merged answer for {}: {} -> {} parameter(s)",
        pending.calculation,
        pending.collected.len(),
        collected.len()
    );
    collected
}
