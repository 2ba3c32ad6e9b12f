//! Cell normalization
//!
//! Questionnaire cells arrive as text. This module coerces them into the
//! declared field types:
//! - integers accept `3` and integral floats such as `3.0`
//! - floats accept any finite number
//! - text is taken verbatim
//!
//! Whitespace around numbers is ignored; an empty cell never coerces to a
//! number.

use crate::error::ReconcileError;
use crate::schema::QuestionnaireRow;

/// Typed access to the cells of one questionnaire row
pub struct CellNormalizer<'a> {
    row: QuestionnaireRow<'a>,
    subject: String,
}

impl<'a> CellNormalizer<'a> {
    /// Errors are attributed to the data row until `identify` is called
    pub fn new(row: QuestionnaireRow<'a>) -> Self {
        Self {
            subject: format!("row {}", row.row_number()),
            row,
        }
    }

    /// Attribute subsequent errors to a participant number
    pub fn identify(&mut self, participant_number: u32) {
        self.subject = format!("participant {}", participant_number);
    }

    pub fn text(&self, column: &str) -> String {
        self.row.get(column).unwrap_or_default().to_string()
    }

    pub fn integer<T>(&self, column: &str) -> Result<T, ReconcileError>
    where
        T: TryFrom<i64>,
    {
        let raw = self.row.get(column).unwrap_or_default();
        parse_integer(raw)
            .and_then(|v| T::try_from(v).ok())
            .ok_or_else(|| self.invalid(column, "integer", raw))
    }

    pub fn float(&self, column: &str) -> Result<f64, ReconcileError> {
        let raw = self.row.get(column).unwrap_or_default();
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.invalid(column, "number", raw))
    }

    fn invalid(&self, column: &str, expected: &'static str, raw: &str) -> ReconcileError {
        ReconcileError::ValidationError {
            subject: self.subject.clone(),
            field: column.to_string(),
            expected,
            value: raw.to_string(),
        }
    }
}

fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Some(v);
    }
    let v = trimmed.parse::<f64>().ok()?;
    // Exports write integer columns with missing values as floats
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}
