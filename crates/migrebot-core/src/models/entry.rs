//! Diary entry models.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::medication::Medication;
use super::symptom::Symptom;
use super::values::PainLevel;

/// One user's diary record for a single calendar date.
///
/// At most one entry exists per `(user_id, entry_date)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: i64,
    pub user_id: i64,
    pub entry_date: NaiveDate,
    pub pain_level: Option<PainLevel>,
    /// 1-10 inclusive
    pub pain_score: Option<i32>,
    pub pain_description: Option<String>,
    pub notes: Option<String>,
    pub had_attack: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An entry together with its child records, in insertion order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryDetails {
    pub entry: Entry,
    pub medications: Vec<Medication>,
    pub symptoms: Vec<Symptom>,
}

/// The current calendar date in the process's local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
