//! Study summary
//!
//! Aggregates the assembled rounds per applied latency so each condition can
//! be compared at a glance: how many rounds ran at that latency, how many
//! blocks were moved on average and how the four questions were answered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{AnswerRound, Participant};

/// Aggregates for all rounds run at one latency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionSummary {
    pub latency_ms: i64,
    pub rounds: usize,
    pub mean_blocks_moved: f64,
    pub mean_delays_experienced: f64,
    pub mean_task_difficulty: f64,
    pub mean_felt_controlling: f64,
    pub mean_felt_part_of_body: f64,
}

/// Whole-study aggregates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudySummary {
    pub participants: usize,
    pub rounds: usize,
    pub total_blocks_moved: u64,
    /// One entry per distinct latency, ascending
    pub conditions: Vec<ConditionSummary>,
}

impl StudySummary {
    pub fn from_participants(participants: &[Participant]) -> Self {
        let mut by_latency: BTreeMap<i64, Vec<&AnswerRound>> = BTreeMap::new();
        for round in participants.iter().flat_map(|p| &p.rounds) {
            by_latency.entry(round.latency_applied).or_default().push(round);
        }

        let conditions = by_latency
            .into_iter()
            .map(|(latency_ms, rounds)| ConditionSummary {
                latency_ms,
                rounds: rounds.len(),
                mean_blocks_moved: mean(&rounds, |r| r.blocks_moved as f64),
                mean_delays_experienced: mean(&rounds, |r| r.delays_experienced as f64),
                mean_task_difficulty: mean(&rounds, |r| r.task_difficulty as f64),
                mean_felt_controlling: mean(&rounds, |r| r.felt_controlling as f64),
                mean_felt_part_of_body: mean(&rounds, |r| r.felt_part_of_body as f64),
            })
            .collect();

        let all_rounds = participants.iter().flat_map(|p| &p.rounds);

        Self {
            participants: participants.len(),
            rounds: all_rounds.clone().count(),
            total_blocks_moved: all_rounds.map(|r| r.blocks_moved as u64).sum(),
            conditions,
        }
    }

    /// Summary for one latency, if any round ran at it
    pub fn condition(&self, latency_ms: i64) -> Option<&ConditionSummary> {
        self.conditions.iter().find(|c| c.latency_ms == latency_ms)
    }
}

/// Mean of one field over a group of rounds
fn mean(rounds: &[&AnswerRound], field: impl Fn(&AnswerRound) -> f64) -> f64 {
    if rounds.is_empty() {
        return 0.0;
    }
    rounds.iter().map(|r| field(*r)).sum::<f64>() / rounds.len() as f64
}
