//! Study configuration
//!
//! Where the inputs live and which participants to leave out. Loaded from
//! TOML; every field has a default matching the study's export layout.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::FileDocumentSource;
use crate::error::ReconcileError;

/// Placeholder replaced by the zero-padded participant number
pub const PARTICIPANT_PLACEHOLDER: &str = "{participant}";

/// Per-participant document path, relative to `data_dir`
pub const DEFAULT_DOCUMENT_PATTERN: &str =
    "sub-{participant}/sub-{participant}_ses-_task-_run-001.json";

/// Reconciliation run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyConfig {
    /// Questionnaire export (CSV)
    pub questionnaire: PathBuf,
    /// Root directory of the per-participant event logs
    pub data_dir: PathBuf,
    /// Document path relative to `data_dir`, with `{participant}` placeholders
    pub document_pattern: String,
    /// Digits the participant number is zero-padded to in paths
    pub participant_padding: usize,
    /// Questionnaire field delimiter
    pub delimiter: char,
    /// Participants dropped before any processing
    pub excluded_participants: BTreeSet<u32>,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            questionnaire: PathBuf::from("data/questionnaire.csv"),
            data_dir: PathBuf::from("data"),
            document_pattern: DEFAULT_DOCUMENT_PATTERN.to_string(),
            participant_padding: 3,
            delimiter: ';',
            excluded_participants: BTreeSet::new(),
        }
    }
}

impl StudyConfig {
    /// Check values are usable. Returns the first problem found.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        if !self.delimiter.is_ascii() {
            return Err(ReconcileError::ConfigError(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            )));
        }
        if !(1..=9).contains(&self.participant_padding) {
            return Err(ReconcileError::ConfigError(format!(
                "participant_padding must be in [1, 9], got {}",
                self.participant_padding
            )));
        }
        if !self.document_pattern.contains(PARTICIPANT_PLACEHOLDER) {
            return Err(ReconcileError::ConfigError(format!(
                "document_pattern must contain {}, got {:?}",
                PARTICIPANT_PLACEHOLDER, self.document_pattern
            )));
        }
        Ok(())
    }

    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ReconcileError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ReconcileError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ReconcileError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ReconcileError> {
        toml::to_string_pretty(self).map_err(|e| ReconcileError::ConfigError(e.to_string()))
    }

    /// Delimiter as the byte the CSV reader expects
    pub fn delimiter_byte(&self) -> u8 {
        // validate() guarantees ASCII
        self.delimiter as u8
    }

    pub fn document_source(&self) -> FileDocumentSource {
        FileDocumentSource::new(
            self.data_dir.clone(),
            self.document_pattern.clone(),
            self.participant_padding,
        )
    }
}
