//! Filesystem document source
//!
//! Resolves one JSON file per participant from a path pattern containing a
//! `{participant}` placeholder, filled with the zero-padded participant number.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::DocumentSource;
use crate::config::PARTICIPANT_PLACEHOLDER;
use crate::error::ReconcileError;
use crate::schema::EventLogDocument;

/// Loads `data_dir/<pattern>` documents from disk
#[derive(Debug, Clone)]
pub struct FileDocumentSource {
    data_dir: PathBuf,
    pattern: String,
    padding: usize,
}

impl FileDocumentSource {
    pub fn new(data_dir: impl Into<PathBuf>, pattern: impl Into<String>, padding: usize) -> Self {
        Self {
            data_dir: data_dir.into(),
            pattern: pattern.into(),
            padding,
        }
    }

    /// Path of the document for a participant
    pub fn path_for(&self, participant_number: u32) -> PathBuf {
        let id = format!("{:0width$}", participant_number, width = self.padding);
        self.data_dir
            .join(self.pattern.replace(PARTICIPANT_PLACEHOLDER, &id))
    }
}

impl DocumentSource for FileDocumentSource {
    fn load(&self, participant_number: u32) -> Result<EventLogDocument, ReconcileError> {
        let path = self.path_for(participant_number);

        let json = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ReconcileError::FileNotFound {
                participant: participant_number,
                path: path.clone(),
            },
            _ => ReconcileError::DocumentParseError {
                participant: participant_number,
                message: format!("cannot read {}: {}", path.display(), e),
            },
        })?;

        tracing::debug!(participant = participant_number, path = %path.display(), bytes = json.len(), "loaded event log");
        EventLogDocument::from_json(&json, participant_number)
    }
}
