//! Report encoding
//!
//! Wraps assembled participants into a `StudyReport` and renders it as JSON
//! or NDJSON (one participant per line).

use chrono::Utc;
use uuid::Uuid;

use crate::assembler::Assembly;
use crate::error::ReconcileError;
use crate::summary::StudySummary;
use crate::types::StudyReport;
use crate::{PRODUCER_NAME, RECONCILE_VERSION};

/// Output encodings for a report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Whole report on one line
    Json,
    /// Whole report, indented
    JsonPretty,
    /// One participant record per line, no envelope
    Ndjson,
}

/// Builds reports stamped with a run identifier
pub struct ReportEncoder {
    run_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create an encoder with a fresh run ID
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific run ID
    pub fn with_run_id(run_id: String) -> Self {
        Self { run_id }
    }

    pub fn encode(&self, num_rounds: usize, assembly: Assembly) -> StudyReport {
        let summary = StudySummary::from_participants(&assembly.participants);

        StudyReport {
            producer: PRODUCER_NAME.to_string(),
            version: RECONCILE_VERSION.to_string(),
            run_id: self.run_id.clone(),
            generated_at_utc: Utc::now().to_rfc3339(),
            num_rounds,
            excluded: assembly.excluded,
            participants: assembly.participants,
            summary,
        }
    }
}

/// Render a report in the requested format
pub fn render(report: &StudyReport, format: ReportFormat) -> Result<String, ReconcileError> {
    let encoding_error = |e: serde_json::Error| ReconcileError::EncodingError(e.to_string());

    match format {
        ReportFormat::Json => serde_json::to_string(report).map_err(encoding_error),
        ReportFormat::JsonPretty => serde_json::to_string_pretty(report).map_err(encoding_error),
        ReportFormat::Ndjson => {
            let mut out = String::new();
            for participant in &report.participants {
                out.push_str(&serde_json::to_string(participant).map_err(encoding_error)?);
                out.push('\n');
            }
            Ok(out)
        }
    }
}
