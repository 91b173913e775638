//! Spanish voice-command interpreter for bedside clinical calculations.
//!
//! [`interpreter::resolve`] turns a speech transcript, plus the pending
//! command from the previous turn if any, into a completed calculation, a
//! follow-up question, or a failure message.

pub mod config;
pub mod conversation;
pub mod error;
pub mod interpreter;
pub mod models;
pub mod output;

pub use config::Config;
pub use conversation::{Conversation, Reply, TurnOutcome};
pub use error::{CalcError, CalcResult};
pub use interpreter::{resolve, Interpreter, PendingCommand, Resolution};
pub use models::{CalculationResult, CalculationType, Gender, Param, ParamValue, ParameterSet};
