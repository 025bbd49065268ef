//! Event date normalization

use chrono::NaiveDate;

use crate::error::DataValidationError;

/// Canonical form every event date is sent in
pub const CANONICAL_DATE_FORMAT: &str = "YYYY-MM-DD";

/// Convert a spreadsheet date into `YYYY-MM-DD`
///
/// Accepted: `MM/DD/YYYY`, `MM/DD/YY`, `YYYY/MM/DD`, `MM-DD-YY`, and dates
/// already in `YYYY-MM-DD`.
pub fn normalize_date(text: &str) -> Result<String, DataValidationError> {
    let value = text.trim();
    let invalid = || DataValidationError::new(value, CANONICAL_DATE_FORMAT);

    let format = if value.contains('/') {
        let segments: Vec<&str> = value.split('/').collect();
        let first = segments.first().copied().unwrap_or_default();
        let last = segments.last().copied().unwrap_or_default();
        match (first.len(), last.len()) {
            (_, 4) => "%m/%d/%Y",
            (4, 2) => "%Y/%m/%d",
            (_, 2) => "%m/%d/%y",
            _ => return Err(invalid()),
        }
    } else if value.contains('-') && value.len() < 10 {
        "%m-%d-%y"
    } else if value.contains('-') && value.len() == 10 {
        "%Y-%m-%d"
    } else {
        return Err(invalid());
    };

    NaiveDate::parse_from_str(value, format)
        .map(|date| date.format("%Y-%m-%d").to_string())
        .map_err(|_| invalid())
}
