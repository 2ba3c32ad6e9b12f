//! Pipeline orchestration
//!
//! This module provides the public API for boxblock-reconcile.
//! It runs a whole study from configuration to report, and exposes the
//! per-document reconstruction used for inspection.

use serde::Serialize;

use crate::adapters::DocumentSource;
use crate::assembler::ParticipantAssembler;
use crate::config::StudyConfig;
use crate::encoder::ReportEncoder;
use crate::error::ReconcileError;
use crate::latency::LatencyExtractor;
use crate::schema::{EventLogDocument, Questionnaire, EXPERIMENT_STREAM};
use crate::segmenter::{pad_to_rounds, RoundSegmenter, Segmentation};
use crate::types::StudyReport;

/// Reconcile a whole study described by a configuration.
///
/// Pipeline stages:
/// 1. Questionnaire - Load the export and resolve `num_rounds`
/// 2. ParticipantAssembler - Reconstruct and validate every participant
/// 3. ReportEncoder - Wrap the participants with a summary
///
/// The first failing participant aborts the run.
pub fn reconcile_study(config: &StudyConfig) -> Result<StudyReport, ReconcileError> {
    config.validate()?;
    let questionnaire = Questionnaire::load(&config.questionnaire, config.delimiter_byte())?;
    let source = config.document_source();
    reconcile_questionnaire(&questionnaire, &source, config)
}

/// Reconcile an already loaded questionnaire against any document source
pub fn reconcile_questionnaire<S: DocumentSource>(
    questionnaire: &Questionnaire,
    source: &S,
    config: &StudyConfig,
) -> Result<StudyReport, ReconcileError> {
    let schema = questionnaire.schema();
    tracing::info!(
        rows = questionnaire.len(),
        num_rounds = schema.num_rounds,
        excluded = config.excluded_participants.len(),
        "reconciling study"
    );

    let assembler = ParticipantAssembler::new(schema, source, &config.excluded_participants);
    let assembly = assembler.assemble_all(questionnaire)?;

    Ok(ReportEncoder::new().encode(schema.num_rounds, assembly))
}

/// What the two extractors recover from one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentInspection {
    pub num_rounds: usize,
    pub latency_markers: usize,
    pub latencies: Vec<i64>,
    pub experiment_markers: usize,
    pub duplicate_experiment_streams: usize,
    pub segmentation: Segmentation,
    /// Block counts after zero-padding to `num_rounds`
    pub blocks_per_round: Vec<u32>,
}

/// Run the extractors over a single document without a questionnaire
pub fn inspect_document(
    document: &EventLogDocument,
    participant_number: u32,
    num_rounds: usize,
) -> Result<DocumentInspection, ReconcileError> {
    let (latency_stream, exp_stream) = document.required_marker_streams(participant_number)?;

    let segmentation = RoundSegmenter::segment(&exp_stream);
    let blocks_per_round = pad_to_rounds(segmentation.counts.clone(), num_rounds);

    Ok(DocumentInspection {
        num_rounds,
        latency_markers: latency_stream.len(),
        latencies: LatencyExtractor::extract(&latency_stream),
        experiment_markers: exp_stream.len(),
        duplicate_experiment_streams: document.stream_count(EXPERIMENT_STREAM) - 1,
        segmentation,
        blocks_per_round,
    })
}
