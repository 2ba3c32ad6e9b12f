//! Latency extraction
//!
//! Recovers the artificial latency applied in each round from the
//! `LatencyMarkers` stream. Each round is announced by a marker of the form
//! `condition_advance|<rep>|<duration>ms|<condition>`; only the duration is
//! used. Malformed markers are skipped without leaving a placeholder.

use crate::schema::MarkerStream;

/// Prefix of the markers announcing the next round's condition
const CONDITION_ADVANCE_PREFIX: &str = "condition_advance|";

/// Extracts per-round latency values from a marker stream
pub struct LatencyExtractor;

impl LatencyExtractor {
    /// Latencies (ms) in the order their rounds occurred
    pub fn extract(stream: &MarkerStream) -> Vec<i64> {
        let mut latencies = Vec::new();

        for token in stream.tokens() {
            if !token.starts_with(CONDITION_ADVANCE_PREFIX) {
                continue;
            }
            match parse_condition_advance(token) {
                Some(latency_ms) => latencies.push(latency_ms),
                None => tracing::debug!(token, "skipping malformed condition marker"),
            }
        }

        latencies
    }
}

/// Duration field of a `condition_advance` token, if well formed
fn parse_condition_advance(token: &str) -> Option<i64> {
    let duration = token.split('|').nth(2)?;
    duration.strip_suffix("ms")?.trim().parse().ok()
}
