//! boxblock-reconcile - Reconciles a teleoperation latency study
//!
//! Each participant of the study moved blocks with a remote-controlled robot
//! over several rounds, each round under an artificial control latency, and
//! answered four questions after every round. Two recordings describe the
//! same rounds:
//!
//! - a questionnaire export with one row per participant and the per-round
//!   answers in repeated columns
//! - an event-log document per participant, whose marker streams announce
//!   each round's latency and bracket each round's block moves
//!
//! The pipeline reconstructs round-aligned latencies and block counts from
//! the markers and joins them with the answers: questionnaire schema →
//! document load → latency extraction + round segmentation → reconciliation
//! → validated participant records.

pub mod adapters;
pub mod assembler;
pub mod config;
pub mod encoder;
pub mod error;
pub mod latency;
pub mod normalizer;
pub mod pipeline;
pub mod reconciler;
pub mod schema;
pub mod segmenter;
pub mod summary;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use adapters::{DocumentSource, FileDocumentSource, InMemoryDocumentSource};
pub use config::StudyConfig;
pub use error::ReconcileError;
pub use pipeline::{inspect_document, reconcile_questionnaire, reconcile_study};
pub use types::{AnswerRound, Participant, StudyReport};

/// Crate version embedded in every report
pub const RECONCILE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "boxblock-reconcile";
