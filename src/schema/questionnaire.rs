//! Questionnaire export schema
//!
//! The questionnaire is a `;`-delimited export with eight static demographic
//! columns followed by the four per-round questions, repeated once per round
//! under the same header text. Repeats are told apart by occurrence: the
//! first keeps the canonical text, the k-th repeat becomes `text.k`.
//!
//! The layout is validated once at load time and yields `num_rounds`, which
//! every downstream stage takes from the resolved `QuestionnaireSchema`.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Serialize;

use crate::error::ReconcileError;

pub const SUBMISSION_ID: &str = "$submission_id";
pub const CREATED: &str = "$created";
pub const PARTICIPANT_NUMBER: &str = "Participant number";
pub const GENDER: &str = "What is your gender";
pub const AGE: &str = "How old are you?";
pub const DOMINANT_HAND: &str = "What is your dominant hand?";
pub const ROBOTICS_EXPERIENCE: &str = "How experienced are you with robotic systems?";
pub const ANSWER_TIME_MS: &str = "$answer_time_ms";

/// Demographic columns, present exactly once
pub const STATIC_COLUMNS: [&str; 8] = [
    SUBMISSION_ID,
    CREATED,
    PARTICIPANT_NUMBER,
    GENDER,
    AGE,
    DOMINANT_HAND,
    ROBOTICS_EXPERIENCE,
    ANSWER_TIME_MS,
];

/// The four questions asked after every round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundQuestion {
    DelaysExperienced,
    TaskDifficulty,
    FeltControlling,
    FeltPartOfBody,
}

impl RoundQuestion {
    pub const ALL: [RoundQuestion; 4] = [
        RoundQuestion::DelaysExperienced,
        RoundQuestion::TaskDifficulty,
        RoundQuestion::FeltControlling,
        RoundQuestion::FeltPartOfBody,
    ];

    /// Header text as it appears in the export (HTML entities included)
    pub fn column_text(&self) -> &'static str {
        match self {
            RoundQuestion::DelaysExperienced => {
                "Did you experience delays between your actions and the robot&#39;s movements?"
            }
            RoundQuestion::TaskDifficulty => "How difficult was it to perform the task?",
            RoundQuestion::FeltControlling => {
                "I felt like I was controlling the movement of the robot"
            }
            RoundQuestion::FeltPartOfBody => "It felt like the robot was part of my body",
        }
    }

    /// Column holding this question's answer for a 0-based round index
    pub fn column_for_round(&self, round_index: usize) -> String {
        if round_index == 0 {
            self.column_text().to_string()
        } else {
            format!("{}.{}", self.column_text(), round_index)
        }
    }
}

/// Resolved column layout of a questionnaire export
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionnaireSchema {
    pub num_rounds: usize,
    pub static_columns: Vec<String>,
    pub repeating_columns: Vec<String>,
}

impl QuestionnaireSchema {
    /// Resolve and validate the layout from disambiguated headers
    pub fn resolve(headers: &[String]) -> Result<Self, ReconcileError> {
        let present: HashSet<&str> = headers.iter().map(String::as_str).collect();

        let missing: Vec<&str> = STATIC_COLUMNS
            .iter()
            .copied()
            .filter(|c| !present.contains(c))
            .collect();
        if !missing.is_empty() {
            return Err(ReconcileError::SchemaError(format!(
                "missing static columns: {}",
                missing.join(", ")
            )));
        }

        let repeating_columns: Vec<String> = headers
            .iter()
            .filter(|h| !STATIC_COLUMNS.contains(&h.as_str()))
            .cloned()
            .collect();

        let questions = RoundQuestion::ALL.len();
        if repeating_columns.len() % questions != 0 {
            return Err(ReconcileError::SchemaError(format!(
                "{} repeating columns is not a multiple of {} questions per round",
                repeating_columns.len(),
                questions
            )));
        }
        let num_rounds = repeating_columns.len() / questions;

        let mut expected = HashSet::with_capacity(repeating_columns.len());
        for round_index in 0..num_rounds {
            for question in RoundQuestion::ALL {
                let column = question.column_for_round(round_index);
                if !present.contains(column.as_str()) {
                    return Err(ReconcileError::SchemaError(format!(
                        "round {} is missing column {:?}",
                        round_index + 1,
                        column
                    )));
                }
                expected.insert(column);
            }
        }

        if let Some(unexpected) = repeating_columns.iter().find(|c| !expected.contains(*c)) {
            return Err(ReconcileError::SchemaError(format!(
                "unexpected column {:?}",
                unexpected
            )));
        }

        Ok(Self {
            num_rounds,
            static_columns: STATIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
            repeating_columns,
        })
    }
}

/// A loaded questionnaire export
#[derive(Debug, Clone)]
pub struct Questionnaire {
    headers: Vec<String>,
    column_index: HashMap<String, usize>,
    records: Vec<csv::StringRecord>,
    schema: QuestionnaireSchema,
}

impl Questionnaire {
    /// Load an export from disk
    pub fn load(path: &Path, delimiter: u8) -> Result<Self, ReconcileError> {
        let file = File::open(path)?;
        Self::from_reader(file, delimiter)
    }

    /// Read an export from any reader and validate its layout
    pub fn from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, ReconcileError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .from_reader(reader);

        let raw_headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let headers = disambiguate_headers(&raw_headers);
        let schema = QuestionnaireSchema::resolve(&headers)?;

        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        let column_index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();

        tracing::info!(
            rows = records.len(),
            columns = headers.len(),
            num_rounds = schema.num_rounds,
            "questionnaire loaded"
        );

        Ok(Self {
            headers,
            column_index,
            records,
            schema,
        })
    }

    pub fn schema(&self) -> &QuestionnaireSchema {
        &self.schema
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows in file order
    pub fn rows(&self) -> impl Iterator<Item = QuestionnaireRow<'_>> {
        self.records.iter().enumerate().map(|(index, record)| QuestionnaireRow {
            index,
            column_index: &self.column_index,
            record,
        })
    }
}

/// Borrowed view of one questionnaire row
#[derive(Debug, Clone, Copy)]
pub struct QuestionnaireRow<'a> {
    index: usize,
    column_index: &'a HashMap<String, usize>,
    record: &'a csv::StringRecord,
}

impl<'a> QuestionnaireRow<'a> {
    /// 1-based data row number (the header line is not counted)
    pub fn row_number(&self) -> usize {
        self.index + 1
    }

    /// Cell value by disambiguated column name
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.column_index
            .get(column)
            .and_then(|&i| self.record.get(i))
    }
}

/// Rename repeated headers by occurrence: `q`, `q.1`, `q.2`, ...
///
/// A generated name never collides with a header already in use; the suffix
/// keeps counting until it is free.
pub fn disambiguate_headers(raw: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<&str, usize> = HashMap::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, header) in raw.iter().enumerate() {
        let header = if i == 0 {
            header.trim_start_matches('\u{feff}')
        } else {
            header.as_str()
        };

        let name = if used.contains(header) {
            let suffix = next_suffix.entry(header).or_insert(1);
            let mut candidate = format!("{}.{}", header, suffix);
            while used.contains(&candidate) {
                *suffix += 1;
                candidate = format!("{}.{}", header, suffix);
            }
            *suffix += 1;
            candidate
        } else {
            header.to_string()
        };

        used.insert(name.clone());
        names.push(name);
    }

    names
}
