//! Assertions over per-run analytics documents.

use serde_json::Value;
use thiserror::Error;

/// Error type for run document validation failures
#[derive(Debug, Error, PartialEq)]
pub enum RecordValidationError {
    #[error("Missing stage record: {0}")]
    MissingStage(String),

    #[error("Missing phase {phase} for stage {stage}")]
    MissingPhase { stage: String, phase: String },

    #[error("Unexpected phase {phase} for stage {stage}")]
    UnexpectedPhase { stage: String, phase: String },

    #[error("Missing enrichment report")]
    MissingEnrichment,

    #[error("Invalid value at {path}: expected {expected}, got {actual}")]
    InvalidValue {
        path: String,
        expected: String,
        actual: String,
    },
}

/// The enrichment report of a run document
pub fn enrichment_report(document: &Value) -> Result<&Value, RecordValidationError> {
    document
        .get("global")
        .and_then(|g| g.get("enrichment"))
        .ok_or(RecordValidationError::MissingEnrichment)
}

/// Asserts that a stage has a record for `phase`, returning it.
pub fn assert_stage_phase<'a>(
    document: &'a Value,
    stage: &str,
    phase: &str,
) -> Result<&'a Value, RecordValidationError> {
    let record = document
        .get("stages")
        .and_then(|s| s.get(stage))
        .ok_or_else(|| RecordValidationError::MissingStage(stage.to_string()))?;

    record
        .get(phase)
        .ok_or_else(|| RecordValidationError::MissingPhase {
            stage: stage.to_string(),
            phase: phase.to_string(),
        })
}

/// Asserts that a stage has no record for `phase`.
pub fn assert_no_stage_phase(document: &Value, stage: &str, phase: &str) -> Result<(), RecordValidationError> {
    let present = document
        .get("stages")
        .and_then(|s| s.get(stage))
        .and_then(|r| r.get(phase))
        .is_some();

    if present {
        return Err(RecordValidationError::UnexpectedPhase {
            stage: stage.to_string(),
            phase: phase.to_string(),
        });
    }
    Ok(())
}

/// Asserts that a field of the enrichment report equals `expected`.
pub fn assert_enrichment_field(
    document: &Value,
    field: &str,
    expected: &Value,
) -> Result<(), RecordValidationError> {
    let report = enrichment_report(document)?;
    let actual = report.get(field).cloned().unwrap_or(Value::Null);

    if &actual != expected {
        return Err(RecordValidationError::InvalidValue {
            path: format!("global.enrichment.{}", field),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}
