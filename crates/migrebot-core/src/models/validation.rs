//! Input bounds shared by entities and mutation contracts.

use chrono::NaiveDate;
use thiserror::Error;

/// Inclusive bounds for pain scores and symptom severity.
pub const SCORE_MIN: i32 = 1;
pub const SCORE_MAX: i32 = 10;

pub const DESCRIPTION_MAX_LEN: usize = 2000;
pub const NOTES_MAX_LEN: usize = 2000;
pub const NAME_MAX_LEN: usize = 200;
pub const DOSAGE_MAX_LEN: usize = 100;
pub const DISPLAY_NAME_MAX_LEN: usize = 255;

/// Malformed or out-of-range input, naming the field and the violated constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i32,
        max: i32,
        value: i32,
    },

    #[error("{field} must be at most {max} characters, got {len}")]
    TooLong {
        field: &'static str,
        max: usize,
        len: usize,
    },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("invalid {field} '{value}': expected one of {accepted}{}", suggestion_hint(.suggestion))]
    InvalidChoice {
        field: &'static str,
        value: String,
        accepted: String,
        suggestion: Option<&'static str>,
    },

    #[error("future date not allowed: {date} is after {today}")]
    FutureDate { date: NaiveDate, today: NaiveDate },

    #[error("{field} must be HH:MM, got '{value}'")]
    InvalidTime { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::OutOfRange { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::Empty { field }
            | ValidationError::InvalidChoice { field, .. }
            | ValidationError::InvalidTime { field, .. } => field,
            ValidationError::FutureDate { .. } => "entry_date",
        }
    }
}

fn suggestion_hint(suggestion: &Option<&'static str>) -> String {
    match suggestion {
        Some(token) => format!(" (did you mean '{}'?)", token),
        None => String::new(),
    }
}

/// Reject scores outside `[SCORE_MIN, SCORE_MAX]`. Never clamps.
pub fn check_score(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if (SCORE_MIN..=SCORE_MAX).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            field,
            min: SCORE_MIN,
            max: SCORE_MAX,
            value,
        })
    }
}

/// Length is counted in characters, not bytes.
pub fn check_max_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong { field, max, len });
    }
    Ok(())
}

/// Required text: non-blank and within `max` characters.
pub fn check_required(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty { field });
    }
    check_max_len(field, value, max)
}

pub fn check_optional_len(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => check_max_len(field, v, max),
        None => Ok(()),
    }
}

/// Accepts zero-padded 24h `HH:MM`.
pub fn check_time_of_day(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidTime {
        field,
        value: value.to_string(),
    };

    let bytes = value.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return Err(invalid());
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    let hours = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
    let minutes = u32::from(bytes[3] - b'0') * 10 + u32::from(bytes[4] - b'0');
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    Ok(())
}
