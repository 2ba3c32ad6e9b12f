//! Error types for boxblock-reconcile

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reconciling a study
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("participant {participant}: required stream `{stream}` not found in event log")]
    MissingStream { participant: u32, stream: String },

    #[error("participant {participant}: event log not found at {}", path.display())]
    FileNotFound { participant: u32, path: PathBuf },

    #[error("participant {participant}: failed to parse event log: {message}")]
    DocumentParseError { participant: u32, message: String },

    #[error("{subject}: field `{field}` is not a valid {expected} (got {value:?})")]
    ValidationError {
        /// "participant N" once the participant number is known, "row N" before
        subject: String,
        field: String,
        expected: &'static str,
        value: String,
    },

    #[error("Questionnaire schema error: {0}")]
    SchemaError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    EncodingError(String),
}
