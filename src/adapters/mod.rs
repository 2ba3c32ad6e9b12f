//! Event-log document sources
//!
//! This module provides the sources that load a participant's event-log
//! document by participant number.

mod file;
mod memory;

pub use file::FileDocumentSource;
pub use memory::InMemoryDocumentSource;

use crate::error::ReconcileError;
use crate::schema::EventLogDocument;

/// Trait for event-log document sources
pub trait DocumentSource {
    /// Load and parse the document recorded for a participant
    fn load(&self, participant_number: u32) -> Result<EventLogDocument, ReconcileError>;
}
