//! Round segmentation
//!
//! The `ExpMarkers` stream brackets each box-and-block round between a start
//! and a stop sentinel and emits `block_moved` for every block transferred.
//! Segmentation walks the flat marker sequence with a two-state machine and
//! counts `block_moved` inside each bracket.
//!
//! Segmentation rules:
//! - a start while outside opens a segment at zero
//! - `boxblock_start` while inside closes the open segment, then reopens
//! - `practice_boxblock_start` while inside reopens without closing
//! - a stop while inside closes the segment; a stop while outside is ignored
//! - a segment still open at the end of the stream is dropped

use serde::Serialize;

use crate::schema::MarkerStream;

pub const BOXBLOCK_START: &str = "boxblock_start";
pub const PRACTICE_BOXBLOCK_START: &str = "practice_boxblock_start";
pub const BOXBLOCK_STOP: &str = "boxblock_stop";
pub const PRACTICE_BOXBLOCK_STOP: &str = "practice_boxblock_stop";
pub const BOXBLOCK_END: &str = "boxblock_end";
pub const BLOCK_MOVED: &str = "block_moved";

/// Segmentation-relevant classification of a marker token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoundaryToken {
    Start { practice: bool },
    Stop,
    BlockMoved,
    Other,
}

impl BoundaryToken {
    fn classify(token: &str) -> Self {
        match token {
            BOXBLOCK_START => BoundaryToken::Start { practice: false },
            PRACTICE_BOXBLOCK_START => BoundaryToken::Start { practice: true },
            BOXBLOCK_STOP | PRACTICE_BOXBLOCK_STOP | BOXBLOCK_END => BoundaryToken::Stop,
            BLOCK_MOVED => BoundaryToken::BlockMoved,
            _ => BoundaryToken::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentState {
    Outside,
    Inside(u32),
}

/// Result of segmenting one stream, before padding
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Segmentation {
    /// Blocks moved per completed segment, in stream order
    pub counts: Vec<u32>,
    /// The stream ended inside a segment, which was not counted
    pub dropped_open_segment: bool,
    /// Open segments abandoned by a practice start
    pub discarded_by_practice_restart: usize,
}

/// Splits an `ExpMarkers` stream into per-round block counts
pub struct RoundSegmenter;

impl RoundSegmenter {
    /// Run the state machine over a stream
    pub fn segment(stream: &MarkerStream) -> Segmentation {
        let mut result = Segmentation::default();
        let mut state = SegmentState::Outside;

        for token in stream.tokens() {
            state = match (state, BoundaryToken::classify(token)) {
                (SegmentState::Outside, BoundaryToken::Start { .. }) => SegmentState::Inside(0),
                (SegmentState::Inside(count), BoundaryToken::Start { practice: false }) => {
                    result.counts.push(count);
                    SegmentState::Inside(0)
                }
                (SegmentState::Inside(_), BoundaryToken::Start { practice: true }) => {
                    result.discarded_by_practice_restart += 1;
                    SegmentState::Inside(0)
                }
                (SegmentState::Inside(count), BoundaryToken::Stop) => {
                    result.counts.push(count);
                    SegmentState::Outside
                }
                (SegmentState::Inside(count), BoundaryToken::BlockMoved) => {
                    SegmentState::Inside(count + 1)
                }
                (state, _) => state,
            };
        }

        result.dropped_open_segment = matches!(state, SegmentState::Inside(_));
        result
    }

    /// Block counts per round, zero-padded up to `num_rounds`.
    ///
    /// Longer sequences are returned as they are.
    pub fn blocks_per_round(stream: &MarkerStream, num_rounds: usize) -> Vec<u32> {
        let segmentation = Self::segment(stream);

        if segmentation.dropped_open_segment {
            tracing::debug!(stream = %stream.name, "stream ended inside a segment; dropped it");
        }
        if segmentation.discarded_by_practice_restart > 0 {
            tracing::debug!(
                stream = %stream.name,
                discarded = segmentation.discarded_by_practice_restart,
                "practice start reopened an unfinished segment"
            );
        }

        pad_to_rounds(segmentation.counts, num_rounds)
    }
}

/// Right-pad with zeros up to `num_rounds`; never truncates
pub fn pad_to_rounds(mut counts: Vec<u32>, num_rounds: usize) -> Vec<u32> {
    if counts.len() < num_rounds {
        counts.resize(num_rounds, 0);
    }
    counts
}
