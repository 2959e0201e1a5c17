//! Symptom models.

use serde::{Deserialize, Serialize};

/// A symptom attached to an entry. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Symptom {
    pub id: i64,
    pub entry_id: i64,
    pub name: String,
    /// 1-10 inclusive
    pub severity: Option<i32>,
}
