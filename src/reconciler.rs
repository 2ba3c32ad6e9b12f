//! Round reconciliation
//!
//! Zips the reconstructed latency and block-count series with a participant's
//! questionnaire answers, by round index. Missing series entries default to
//! zero; entries beyond `num_rounds` are left unused.

use crate::error::ReconcileError;
use crate::normalizer::CellNormalizer;
use crate::schema::{QuestionnaireSchema, RoundQuestion};
use crate::types::AnswerRound;

/// Builds the fixed per-round records for one participant
pub struct RoundReconciler;

impl RoundReconciler {
    /// One `AnswerRound` per round in the schema, numbered from 1
    pub fn reconcile(
        latencies: &[i64],
        blocks_moved: &[u32],
        schema: &QuestionnaireSchema,
        cells: &CellNormalizer<'_>,
    ) -> Result<Vec<AnswerRound>, ReconcileError> {
        let num_rounds = schema.num_rounds;

        if latencies.len() > num_rounds || blocks_moved.len() > num_rounds {
            tracing::warn!(
                latencies = latencies.len(),
                segments = blocks_moved.len(),
                num_rounds,
                "more reconstructed rounds than questionnaire rounds; extra values unused"
            );
        }

        (0..num_rounds)
            .map(|i| -> Result<AnswerRound, ReconcileError> {
                let answer = |q: RoundQuestion| cells.integer::<i32>(&q.column_for_round(i));

                Ok(AnswerRound {
                    round_number: (i + 1) as u32,
                    latency_applied: latencies.get(i).copied().unwrap_or(0),
                    blocks_moved: blocks_moved.get(i).copied().unwrap_or(0),
                    delays_experienced: answer(RoundQuestion::DelaysExperienced)?,
                    task_difficulty: answer(RoundQuestion::TaskDifficulty)?,
                    felt_controlling: answer(RoundQuestion::FeltControlling)?,
                    felt_part_of_body: answer(RoundQuestion::FeltPartOfBody)?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Questionnaire;
    use crate::test_support::build_csv;
    use pretty_assertions::assert_eq;

    fn reconcile_one(
        rounds: usize,
        answers: Vec<[&str; 4]>,
        latencies: &[i64],
        blocks: &[u32],
    ) -> Result<Vec<AnswerRound>, ReconcileError> {
        let csv = build_csv(rounds, &[("1", "30", answers)]);
        let questionnaire = Questionnaire::from_reader(csv.as_bytes(), b';').unwrap();
        let cells = CellNormalizer::new(questionnaire.rows().next().unwrap());
        RoundReconciler::reconcile(latencies, blocks, questionnaire.schema(), &cells)
    }

    #[test]
    fn test_two_round_scenario() {
        let rounds = reconcile_one(
            2,
            vec![["1", "2", "6", "5"], ["3", "4", "5", "4"]],
            &[200, 0],
            &[2, 0],
        )
        .unwrap();

        assert_eq!(
            rounds,
            vec![
                AnswerRound {
                    round_number: 1,
                    latency_applied: 200,
                    blocks_moved: 2,
                    delays_experienced: 1,
                    task_difficulty: 2,
                    felt_controlling: 6,
                    felt_part_of_body: 5,
                },
                AnswerRound {
                    round_number: 2,
                    latency_applied: 0,
                    blocks_moved: 0,
                    delays_experienced: 3,
                    task_difficulty: 4,
                    felt_controlling: 5,
                    felt_part_of_body: 4,
                },
            ]
        );
    }

    #[test]
    fn test_short_series_default_to_zero() {
        let rounds = reconcile_one(
            3,
            vec![["1", "1", "1", "1"], ["2", "2", "2", "2"], ["3", "3", "3", "3"]],
            &[100],
            &[],
        )
        .unwrap();

        assert_eq!(rounds.len(), 3);
        assert_eq!(rounds[0].latency_applied, 100);
        assert_eq!(rounds[1].latency_applied, 0);
        assert_eq!(rounds[2].latency_applied, 0);
        assert!(rounds.iter().all(|r| r.blocks_moved == 0));
        assert_eq!(rounds[2].felt_part_of_body, 3);
    }

    #[test]
    fn test_long_series_not_reflected() {
        let rounds = reconcile_one(1, vec![["1", "2", "3", "4"]], &[50, 100, 150], &[7, 8]).unwrap();
        assert_eq!(rounds.len(), 1);
        assert_eq!(rounds[0].latency_applied, 50);
        assert_eq!(rounds[0].blocks_moved, 7);
    }

    #[test]
    fn test_bad_answer_names_column() {
        let err = reconcile_one(2, vec![["1", "2", "3", "4"], ["1", "", "3", "4"]], &[], &[])
            .unwrap_err();

        match err {
            ReconcileError::ValidationError { field, .. } => {
                assert_eq!(field, RoundQuestion::TaskDifficulty.column_for_round(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
