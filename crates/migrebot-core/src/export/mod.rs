//! Tabular export of diary entries.
//!
//! Both encodings project entries onto the same six columns and keep the
//! caller's order. Output depends only on the input list: equal input yields
//! byte-identical files.

mod delimited;
mod spreadsheet;

pub use delimited::build_csv;
pub use spreadsheet::build_xlsx;

use std::fmt;
use std::str::FromStr;

use chrono::{Duration, NaiveDate};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::models::{Entry, ValidationError};

/// Column headers, in order.
pub const EXPORT_HEADERS: [&str; 6] = [
    "Дата",
    "Уровень боли (категория)",
    "Оценка боли (1-10)",
    "Описание боли",
    "Приступ",
    "Заметки",
];

pub const ATTACK_YES: &str = "да";
pub const ATTACK_NO: &str = "нет";

/// File name prefix used by the export command.
pub const DEFAULT_PREFIX: &str = "migrebot_entries";

/// Length of the rolling export window, in days before today.
pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Longest window `ExportWindow::last_days` accepts.
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// Target encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    /// Encode `entries` in this format.
    pub fn encode(&self, entries: &[Entry]) -> ExportResult<Vec<u8>> {
        match self {
            ExportFormat::Csv => build_csv(entries),
            ExportFormat::Xlsx => build_xlsx(entries),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            _ => Err(ValidationError::InvalidChoice {
                field: "format",
                value: s.to_string(),
                accepted: "csv, xlsx".to_string(),
                suggestion: None,
            }),
        }
    }
}

/// Inclusive date range covered by an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ExportWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[today - days, today]`, for `days` in `1..=MAX_WINDOW_DAYS`.
    pub fn last_days(today: NaiveDate, days: u32) -> Result<Self, ValidationError> {
        let out_of_range = || ValidationError::OutOfRange {
            field: "export_days",
            min: 1,
            max: MAX_WINDOW_DAYS as i32,
            value: i32::try_from(days).unwrap_or(i32::MAX),
        };
        if !(1..=MAX_WINDOW_DAYS).contains(&days) {
            return Err(out_of_range());
        }
        let start = today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .ok_or_else(out_of_range)?;
        Ok(Self { start, end: today })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// `<prefix>_<start>_<end>.<ext>` with ISO-8601 dates.
    pub fn filename(&self, prefix: &str, format: ExportFormat) -> String {
        format!(
            "{}_{}_{}.{}",
            prefix,
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d"),
            format.extension()
        )
    }
}

/// An encoded export ready to hand to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub format: ExportFormat,
    pub window: ExportWindow,
    pub entry_count: usize,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    /// Encode `entries` (already bounded to `window` and sorted) into a named file.
    pub fn render(
        entries: &[Entry],
        format: ExportFormat,
        window: ExportWindow,
        prefix: &str,
    ) -> ExportResult<Self> {
        let bytes = format.encode(entries)?;
        Ok(Self {
            filename: window.filename(prefix, format),
            format,
            window,
            entry_count: entries.len(),
            bytes,
        })
    }

    /// SHA-256 of the payload, hex encoded.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(&self.bytes);
        hex::encode(hasher.finalize())
    }
}

/// Two-state rendering of the attack flag.
pub fn attack_token(had_attack: bool) -> &'static str {
    if had_attack {
        ATTACK_YES
    } else {
        ATTACK_NO
    }
}

/// Project an entry onto the export columns.
pub fn entry_row(entry: &Entry) -> [String; 6] {
    [
        entry.entry_date.format("%Y-%m-%d").to_string(),
        entry
            .pain_level
            .map(|level| level.as_str().to_string())
            .unwrap_or_default(),
        entry
            .pain_score
            .map(|score| score.to_string())
            .unwrap_or_default(),
        entry.pain_description.clone().unwrap_or_default(),
        attack_token(entry.had_attack).to_string(),
        entry.notes.clone().unwrap_or_default(),
    ]
}
