//! Medication models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::values::MedicationType;

/// A medication attached to an entry. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Medication {
    pub id: i64,
    pub entry_id: i64,
    pub name: String,
    pub medication_type: MedicationType,
    /// Free-form dosage (e.g., "400mg", "2 tablets")
    pub dosage: Option<String>,
    /// Assigned by the store when the caller supplies none
    pub taken_at: DateTime<Utc>,
}
