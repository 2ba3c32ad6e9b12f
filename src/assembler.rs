//! Participant assembly
//!
//! Turns one questionnaire row into a validated `Participant`:
//! 1. Coerce the participant number, and skip the row if excluded
//! 2. Load that participant's event-log document
//! 3. Extract latencies and segment block counts
//! 4. Reconcile them with the row's per-round answers
//! 5. Coerce the demographic fields

use std::collections::BTreeSet;

use crate::adapters::DocumentSource;
use crate::error::ReconcileError;
use crate::latency::LatencyExtractor;
use crate::normalizer::CellNormalizer;
use crate::reconciler::RoundReconciler;
use crate::schema::{
    Questionnaire, QuestionnaireRow, QuestionnaireSchema, AGE, ANSWER_TIME_MS, CREATED,
    DOMINANT_HAND, GENDER, PARTICIPANT_NUMBER, ROBOTICS_EXPERIENCE, SUBMISSION_ID,
};
use crate::segmenter::RoundSegmenter;
use crate::types::Participant;

/// Outcome of assembling one row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Assembled(Participant),
    Excluded(u32),
}

/// Participants assembled from a whole questionnaire
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assembly {
    /// In questionnaire row order
    pub participants: Vec<Participant>,
    /// Excluded participant numbers, in the order their rows appeared
    pub excluded: Vec<u32>,
}

/// Assembles participants against a resolved schema and a document source
pub struct ParticipantAssembler<'a, S: DocumentSource> {
    schema: &'a QuestionnaireSchema,
    source: &'a S,
    exclusions: &'a BTreeSet<u32>,
}

impl<'a, S: DocumentSource> ParticipantAssembler<'a, S> {
    pub fn new(
        schema: &'a QuestionnaireSchema,
        source: &'a S,
        exclusions: &'a BTreeSet<u32>,
    ) -> Self {
        Self {
            schema,
            source,
            exclusions,
        }
    }

    /// Assemble every row in order. The first failure aborts the batch.
    pub fn assemble_all(&self, questionnaire: &Questionnaire) -> Result<Assembly, ReconcileError> {
        let mut assembly = Assembly::default();

        for row in questionnaire.rows() {
            match self.assemble(row)? {
                RowOutcome::Assembled(participant) => assembly.participants.push(participant),
                RowOutcome::Excluded(number) => assembly.excluded.push(number),
            }
        }

        tracing::info!(
            assembled = assembly.participants.len(),
            excluded = assembly.excluded.len(),
            "participants assembled"
        );
        Ok(assembly)
    }

    /// Assemble a single row
    pub fn assemble(&self, row: QuestionnaireRow<'_>) -> Result<RowOutcome, ReconcileError> {
        let mut cells = CellNormalizer::new(row);
        let participant_number: u32 = cells.integer(PARTICIPANT_NUMBER)?;

        if self.exclusions.contains(&participant_number) {
            tracing::debug!(participant = participant_number, "excluded; skipping");
            return Ok(RowOutcome::Excluded(participant_number));
        }
        cells.identify(participant_number);

        let document = self.source.load(participant_number)?;

        let (latency_stream, exp_stream) = document.required_marker_streams(participant_number)?;
        let latencies = LatencyExtractor::extract(&latency_stream);
        let blocks_moved = RoundSegmenter::blocks_per_round(&exp_stream, self.schema.num_rounds);

        tracing::debug!(
            participant = participant_number,
            latencies = ?latencies,
            blocks_moved = ?blocks_moved,
            "reconstructed rounds"
        );

        let rounds = RoundReconciler::reconcile(&latencies, &blocks_moved, self.schema, &cells)?;

        Ok(RowOutcome::Assembled(Participant {
            submission_id: cells.integer(SUBMISSION_ID)?,
            created: cells.text(CREATED),
            participant_number,
            gender: cells.text(GENDER),
            age: cells.integer(AGE)?,
            dominant_hand: cells.text(DOMINANT_HAND),
            robotics_experience: cells.integer(ROBOTICS_EXPERIENCE)?,
            answer_time_ms: cells.float(ANSWER_TIME_MS)?,
            rounds,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDocumentSource;
    use crate::schema::{EXPERIMENT_STREAM, LATENCY_STREAM};
    use crate::test_support::{build_csv, document_json, EXP_TWO_ROUNDS, LATENCY_TWO_ROUNDS};
    use pretty_assertions::assert_eq;

    fn two_round_questionnaire(rows: &[(&str, &str)]) -> Questionnaire {
        let rows: Vec<(&str, &str, Vec<[&str; 4]>)> = rows
            .iter()
            .map(|(p, age)| (*p, *age, vec![["2", "3", "6", "5"], ["4", "5", "3", "2"]]))
            .collect();
        Questionnaire::from_reader(build_csv(2, &rows).as_bytes(), b';').unwrap()
    }

    fn two_round_source(participants: &[u32]) -> InMemoryDocumentSource {
        let mut source = InMemoryDocumentSource::new();
        for &p in participants {
            source.insert_json(p, document_json(&EXP_TWO_ROUNDS, &LATENCY_TWO_ROUNDS));
        }
        source
    }

    #[test]
    fn test_assemble_participant() {
        let questionnaire = two_round_questionnaire(&[("1", "24")]);
        let source = two_round_source(&[1]);
        let exclusions = BTreeSet::new();
        let assembler = ParticipantAssembler::new(questionnaire.schema(), &source, &exclusions);

        let assembly = assembler.assemble_all(&questionnaire).unwrap();
        assert_eq!(assembly.participants.len(), 1);

        let p = &assembly.participants[0];
        assert_eq!(p.participant_number, 1);
        assert_eq!(p.submission_id, 1000);
        assert_eq!(p.created, "2025-11-10 14:02:11");
        assert_eq!(p.age, 24);
        assert_eq!(p.dominant_hand, "Right hand");
        assert_eq!(p.robotics_experience, 2);
        assert_eq!(p.rounds.len(), 2);
        assert_eq!(
            (p.rounds[0].round_number, p.rounds[0].latency_applied, p.rounds[0].blocks_moved),
            (1, 200, 2)
        );
        assert_eq!(
            (p.rounds[1].round_number, p.rounds[1].latency_applied, p.rounds[1].blocks_moved),
            (2, 0, 0)
        );
        assert_eq!(p.rounds[1].felt_controlling, 3);
    }

    #[test]
    fn test_excluded_participant_never_loaded() {
        // Participant 4 has no document at all; exclusion must win
        let questionnaire = two_round_questionnaire(&[("1", "24"), ("4", "31"), ("2", "40")]);
        let source = two_round_source(&[1, 2]);
        let exclusions = BTreeSet::from([4]);
        let assembler = ParticipantAssembler::new(questionnaire.schema(), &source, &exclusions);

        let assembly = assembler.assemble_all(&questionnaire).unwrap();
        let numbers: Vec<u32> = assembly
            .participants
            .iter()
            .map(|p| p.participant_number)
            .collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(assembly.excluded, vec![4]);
    }

    #[test]
    fn test_missing_document_aborts_batch() {
        let questionnaire = two_round_questionnaire(&[("1", "24"), ("2", "40")]);
        let source = two_round_source(&[1]);
        let exclusions = BTreeSet::new();
        let assembler = ParticipantAssembler::new(questionnaire.schema(), &source, &exclusions);

        assert!(matches!(
            assembler.assemble_all(&questionnaire),
            Err(ReconcileError::FileNotFound { participant: 2, .. })
        ));
    }

    #[test]
    fn test_missing_latency_stream() {
        let questionnaire = two_round_questionnaire(&[("1", "24")]);
        let json = r#"{"streams": [{"info": {"name": "ExpMarkers"}, "time_series": []}]}"#;
        let source = InMemoryDocumentSource::new().with_json(1, json);
        let exclusions = BTreeSet::new();
        let assembler = ParticipantAssembler::new(questionnaire.schema(), &source, &exclusions);

        match assembler.assemble_all(&questionnaire).unwrap_err() {
            ReconcileError::MissingStream { participant, stream } => {
                assert_eq!(participant, 1);
                assert_eq!(stream, LATENCY_STREAM);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_experiment_stream() {
        let questionnaire = two_round_questionnaire(&[("1", "24")]);
        let json = r#"{"streams": [{"info": {"name": "LatencyMarkers"}, "time_series": []}]}"#;
        let source = InMemoryDocumentSource::new().with_json(1, json);
        let exclusions = BTreeSet::new();
        let assembler = ParticipantAssembler::new(questionnaire.schema(), &source, &exclusions);

        assert!(matches!(
            assembler.assemble_all(&questionnaire),
            Err(ReconcileError::MissingStream { participant: 1, ref stream }) if stream == EXPERIMENT_STREAM
        ));
    }

    #[test]
    fn test_malformed_markers_reported_before_missing_stream() {
        let questionnaire = two_round_questionnaire(&[("1", "24")]);
        let json = r#"{"streams": [{"info": {"name": "ExpMarkers"}, "time_series": [[3]]}]}"#;
        let source = InMemoryDocumentSource::new().with_json(1, json);
        let exclusions = BTreeSet::new();
        let assembler = ParticipantAssembler::new(questionnaire.schema(), &source, &exclusions);

        assert!(matches!(
            assembler.assemble_all(&questionnaire),
            Err(ReconcileError::DocumentParseError { participant: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_age_names_field() {
        let questionnaire = two_round_questionnaire(&[("1", "unknown")]);
        let source = two_round_source(&[1]);
        let exclusions = BTreeSet::new();
        let assembler = ParticipantAssembler::new(questionnaire.schema(), &source, &exclusions);

        match assembler.assemble_all(&questionnaire).unwrap_err() {
            ReconcileError::ValidationError { subject, field, .. } => {
                assert_eq!(subject, "participant 1");
                assert_eq!(field, AGE);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_participant_number_names_row() {
        let questionnaire = two_round_questionnaire(&[("1", "24"), ("P2", "40")]);
        let source = two_round_source(&[1]);
        let exclusions = BTreeSet::new();
        let assembler = ParticipantAssembler::new(questionnaire.schema(), &source, &exclusions);

        match assembler.assemble_all(&questionnaire).unwrap_err() {
            ReconcileError::ValidationError { subject, field, .. } => {
                assert_eq!(subject, "row 2");
                assert_eq!(field, PARTICIPANT_NUMBER);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_experiment_streams_counted_once() {
        let questionnaire = two_round_questionnaire(&[("1", "24")]);
        let series: Vec<Vec<&str>> = EXP_TWO_ROUNDS.iter().map(|t| vec![*t]).collect();
        let latency: Vec<Vec<&str>> = LATENCY_TWO_ROUNDS.iter().map(|t| vec![*t]).collect();
        let json = serde_json::json!({
            "streams": [
                { "info": { "name": "ExpMarkers" }, "time_series": series },
                { "info": { "name": "LatencyMarkers" }, "time_series": latency },
                { "info": { "name": "ExpMarkers" }, "time_series": series }
            ]
        })
        .to_string();

        let duplicated = InMemoryDocumentSource::new().with_json(1, json);
        let single = two_round_source(&[1]);
        let exclusions = BTreeSet::new();

        let a = ParticipantAssembler::new(questionnaire.schema(), &duplicated, &exclusions)
            .assemble_all(&questionnaire)
            .unwrap();
        let b = ParticipantAssembler::new(questionnaire.schema(), &single, &exclusions)
            .assemble_all(&questionnaire)
            .unwrap();
        assert_eq!(a, b);
    }
}
