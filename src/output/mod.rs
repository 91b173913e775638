use crate::conversation::{Reply, TurnOutcome};
use crate::error::CalcResult;
use crate::models::CalculationResult;
use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// One handled transcript, kept for the session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: usize,
    pub timestamp: DateTime<Utc>,
    pub transcript: String,
    pub outcome: TurnOutcome,
    pub speech: String,
    pub result: Option<CalculationResult>,
}

impl TurnRecord {
    pub fn new(turn: usize, transcript: &str, reply: &Reply) -> Self {
        Self {
            turn,
            timestamp: Utc::now(),
            transcript: transcript.to_string(),
            outcome: reply.outcome,
            speech: reply.speech.clone(),
            result: reply.result.clone(),
        }
    }
}

/// What gets spoken back after a completed calculation.
pub fn spoken_summary(result: &CalculationResult, ask_details: bool) -> String {
    let mut speech = format!("El resultado es {} {}.", result.result, result.unit);
    if ask_details {
        speech.push_str(" ¿Quieres ver el cálculo y la fórmula?");
    }
    speech
}

pub fn details_text(result: &CalculationResult) -> String {
    let mut text = format!("Fórmula: {}\nCálculo: {}", result.formula, result.explanation);
    if let Some(interpretation) = &result.interpretation {
        text.push_str(&format!("\nInterpretación: {}", interpretation));
    }
    text
}

pub fn save_results<P: AsRef<Path>>(records: &[TurnRecord], output_dir: P) -> CalcResult<()> {
    let output_path = output_dir.as_ref();

    save_turns(records, output_path.join("turns.csv"))?;
    save_session(records, output_path.join("session.json"))?;

    info!("Session log saved to {:?}", output_path);
    Ok(())
}

fn save_turns<P: AsRef<Path>>(records: &[TurnRecord], path: P) -> CalcResult<()> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "TURN", "TIMESTAMP", "TRANSCRIPT", "OUTCOME", "RESULT", "UNIT", "INTERPRETATION", "SPEECH"
    ])?;

    for record in records {
        let (value, unit, interpretation) = match &record.result {
            Some(r) => (
                r.result.to_string(),
                r.unit.clone(),
                r.interpretation.clone().unwrap_or_default(),
            ),
            None => (String::new(), String::new(), String::new()),
        };

        writer.write_record([
            record.turn.to_string(),
            record.timestamp.to_rfc3339(),
            record.transcript.clone(),
            outcome_label(record.outcome).to_string(),
            value,
            unit,
            interpretation,
            record.speech.clone(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn save_session<P: AsRef<Path>>(records: &[TurnRecord], path: P) -> CalcResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, records)?;
    Ok(())
}

fn outcome_label(outcome: TurnOutcome) -> &'static str {
    match outcome {
        TurnOutcome::Completed => "completed",
        TurnOutcome::NeedsMoreInfo => "needs_more_info",
        TurnOutcome::Failed => "failed",
        TurnOutcome::DetailsShown => "details_shown",
        TurnOutcome::DetailsDeclined => "details_declined",
        TurnOutcome::Cancelled => "cancelled",
    }
}
