//! Core types for boxblock-reconcile
//!
//! These are the records that leave the pipeline: one `AnswerRound` per
//! reconstructed round, one `Participant` per questionnaire row, and the
//! `StudyReport` envelope that wraps a whole run.

use serde::{Deserialize, Serialize};

use crate::summary::StudySummary;

/// One round of the box-and-block task, aligned across both data sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRound {
    /// 1-based round index
    pub round_number: u32,
    /// Artificial latency applied during the round (ms), from `LatencyMarkers`
    pub latency_applied: i64,
    /// Blocks moved during the round, from `ExpMarkers`
    pub blocks_moved: u32,
    /// Answer to "Did you experience delays..."
    pub delays_experienced: i32,
    /// Answer to "How difficult was it..."
    pub task_difficulty: i32,
    /// Answer to "I felt like I was controlling..."
    pub felt_controlling: i32,
    /// Answer to "It felt like the robot was part of my body"
    pub felt_part_of_body: i32,
}

/// Demographics and per-round records for one study participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub submission_id: i64,
    /// Submission timestamp, kept verbatim from the export
    pub created: String,
    /// Key joining the questionnaire row to the event-log document
    pub participant_number: u32,
    pub gender: String,
    pub age: u32,
    /// "Right hand", "Left hand", "Ambidextrous", ...
    pub dominant_hand: String,
    pub robotics_experience: i32,
    pub answer_time_ms: f64,
    pub rounds: Vec<AnswerRound>,
}

/// Complete output of one reconciliation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyReport {
    pub producer: String,
    pub version: String,
    pub run_id: String,
    pub generated_at_utc: String,
    /// Rounds per participant, resolved from the questionnaire columns
    pub num_rounds: usize,
    /// Participant numbers that were present in the questionnaire but excluded
    pub excluded: Vec<u32>,
    pub participants: Vec<Participant>,
    pub summary: StudySummary,
}
