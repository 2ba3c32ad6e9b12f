//! Fixtures shared by the unit tests

use crate::schema::{RoundQuestion, STATIC_COLUMNS};

/// Build a `;`-delimited export with `rounds` repeats of the question block.
/// Each row is (participant number, age, answers per round). Cells are quoted
/// where needed, as the real export quotes the `&#39;` header.
pub(crate) fn build_csv(rounds: usize, rows: &[(&str, &str, Vec<[&str; 4]>)]) -> String {
    let mut header: Vec<String> = STATIC_COLUMNS.iter().map(|c| c.to_string()).collect();
    for _ in 0..rounds {
        for q in RoundQuestion::ALL {
            header.push(q.column_text().to_string());
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(Vec::new());
    writer.write_record(&header).unwrap();

    for (i, (participant, age, answers)) in rows.iter().enumerate() {
        let mut cells = vec![
            format!("{}", 1000 + i),
            "2025-11-10 14:02:11".to_string(),
            participant.to_string(),
            "Female".to_string(),
            age.to_string(),
            "Right hand".to_string(),
            "2".to_string(),
            "183250.5".to_string(),
        ];
        for round in answers {
            cells.extend(round.iter().map(|a| a.to_string()));
        }
        writer.write_record(&cells).unwrap();
    }

    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

/// Event-log JSON with one `ExpMarkers` and one `LatencyMarkers` stream
pub(crate) fn document_json(exp_markers: &[&str], latency_markers: &[&str]) -> String {
    let series = |tokens: &[&str]| -> Vec<Vec<String>> {
        tokens.iter().map(|t| vec![t.to_string()]).collect()
    };
    serde_json::json!({
        "streams": [
            { "info": { "name": "ExpMarkers", "type": "Markers" }, "time_series": series(exp_markers) },
            { "info": { "name": "LatencyMarkers", "type": "Markers" }, "time_series": series(latency_markers) }
        ]
    })
    .to_string()
}

/// The two-round scenario: 2 blocks at 200ms, then 0 blocks at 0ms
pub(crate) const EXP_TWO_ROUNDS: [&str; 6] = [
    "boxblock_start",
    "block_moved",
    "block_moved",
    "boxblock_stop",
    "boxblock_start",
    "boxblock_stop",
];

pub(crate) const LATENCY_TWO_ROUNDS: [&str; 2] = [
    "condition_advance|rep_1|200ms|condition_1",
    "condition_advance|rep_2|0ms|condition_2",
];
