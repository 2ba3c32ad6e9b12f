//! In-memory document source

use std::collections::HashMap;
use std::path::PathBuf;

use super::DocumentSource;
use crate::error::ReconcileError;
use crate::schema::EventLogDocument;

/// Documents held in memory, keyed by participant number.
///
/// Raw JSON is parsed on every load, so parse failures surface the same way
/// they do for files.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentSource {
    documents: HashMap<u32, String>,
}

impl InMemoryDocumentSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_json(&mut self, participant_number: u32, json: impl Into<String>) {
        self.documents.insert(participant_number, json.into());
    }

    pub fn insert(
        &mut self,
        participant_number: u32,
        document: &EventLogDocument,
    ) -> Result<(), ReconcileError> {
        let json = serde_json::to_string(document)
            .map_err(|e| ReconcileError::EncodingError(e.to_string()))?;
        self.insert_json(participant_number, json);
        Ok(())
    }

    pub fn with_json(mut self, participant_number: u32, json: impl Into<String>) -> Self {
        self.insert_json(participant_number, json);
        self
    }
}

impl DocumentSource for InMemoryDocumentSource {
    fn load(&self, participant_number: u32) -> Result<EventLogDocument, ReconcileError> {
        let json = self
            .documents
            .get(&participant_number)
            .ok_or_else(|| ReconcileError::FileNotFound {
                participant: participant_number,
                path: PathBuf::from(format!("memory://{}", participant_number)),
            })?;
        EventLogDocument::from_json(json, participant_number)
    }
}
