//! Input schemas
//!
//! This module defines the two inputs of a reconciliation run: the
//! per-participant event-log document and the questionnaire export.

mod document;
mod questionnaire;

pub use document::*;
pub use questionnaire::*;
