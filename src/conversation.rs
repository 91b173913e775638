//! Caller-side turn loop: threads the pending command between turns and
//! handles the "show the formula?" follow-up question.

use crate::config::Config;
use crate::interpreter::classifier::detect_calculation;
use crate::interpreter::extractor::{is_affirmative, is_cancellation, normalize};
use crate::interpreter::{Interpreter, PendingCommand, Resolution};
use crate::models::CalculationResult;
use crate::output;
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const GREETING: &str = "¿Qué cálculo médico necesitas realizar?";
pub const DETAILS_SHOWN: &str = "Aquí tienes la fórmula y el cálculo detallado.";
pub const DETAILS_DECLINED: &str = "De acuerdo, ¿en qué más puedo ayudarte?";
pub const CANCELLED: &str = "De acuerdo, cancelo el cálculo. ¿Qué cálculo médico necesitas realizar?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    Completed,
    NeedsMoreInfo,
    Failed,
    DetailsShown,
    DetailsDeclined,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub outcome: TurnOutcome,
    pub speech: String,
    pub result: Option<CalculationResult>,
    pub show_details: bool,
}

impl Reply {
    fn speak(outcome: TurnOutcome, speech: impl Into<String>) -> Self {
        Self { outcome, speech: speech.into(), result: None, show_details: false }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    AwaitingParameters(PendingCommand),
    AwaitingDetailsAnswer(CalculationResult),
}

pub struct Conversation {
    interpreter: Interpreter,
    offer_details: bool,
    state: State,
}

impl Conversation {
    pub fn new(config: &Config) -> Self {
        Self {
            interpreter: Interpreter::new(config.calculator.clone()),
            offer_details: config.conversation.offer_details,
            state: State::Idle,
        }
    }

    pub fn pending(&self) -> Option<&PendingCommand> {
        match &self.state {
            State::AwaitingParameters(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.state == State::Idle
    }

    /// Drops any outstanding question and greets again.
    pub fn reset(&mut self) -> Reply {
        self.state = State::Idle;
        Reply::speak(TurnOutcome::Cancelled, GREETING)
    }

    pub fn handle(&mut self, transcript: &str) -> Reply {
        let text = normalize(transcript);
        let state = std::mem::replace(&mut self.state, State::Idle);

        match state {
            State::AwaitingDetailsAnswer(result) => {
                if is_affirmative(&text) {
                    debug!("Showing details for last result");
                    Reply {
                        outcome: TurnOutcome::DetailsShown,
                        speech: DETAILS_SHOWN.to_string(),
                        result: Some(result),
                        show_details: true,
                    }
                } else {
                    Reply::speak(TurnOutcome::DetailsDeclined, DETAILS_DECLINED)
                }
            },
            State::AwaitingParameters(pending) => {
                if is_cancellation(&text) {
                    info!("Abandoned pending {} command", pending.calculation);
                    return Reply::speak(TurnOutcome::Cancelled, CANCELLED);
                }
                // Naming a different calculation drops the pending one.
                if let Some(other) = detect_calculation(&text).filter(|c| *c != pending.calculation) {
                    info!("Switched from pending {} command to {}", pending.calculation, other);
                    let resolution = self.interpreter.resolve(&text, None);
                    return self.apply(resolution);
                }
                let resolution = self.interpreter.resolve(&text, Some(&pending));
                self.apply(resolution)
            },
            State::Idle => {
                let resolution = self.interpreter.resolve(&text, None);
                self.apply(resolution)
            },
        }
    }

    fn apply(&mut self, resolution: Resolution) -> Reply {
        match resolution {
            Resolution::Completed(result) => {
                let speech = output::spoken_summary(&result, self.offer_details);
                if self.offer_details {
                    self.state = State::AwaitingDetailsAnswer(result.clone());
                }
                Reply {
                    outcome: TurnOutcome::Completed,
                    speech,
                    result: Some(result),
                    show_details: false,
                }
            },
            Resolution::NeedsMoreInfo { calculation, missing, collected, prompt } => {
                self.state = State::AwaitingParameters(PendingCommand { calculation, collected, missing });
                Reply::speak(TurnOutcome::NeedsMoreInfo, prompt)
            },
            Resolution::Failed { message } => Reply::speak(TurnOutcome::Failed, message),
        }
    }
}
