//! Validated input shapes accepted by the repository layer.

use chrono::{DateTime, NaiveDate, Utc};

use super::entry::{today, Entry};
use super::validation::{
    check_optional_len, check_required, check_score, ValidationError, DESCRIPTION_MAX_LEN,
    DOSAGE_MAX_LEN, NAME_MAX_LEN, NOTES_MAX_LEN,
};
use super::values::{MedicationType, PainLevel};

/// Field presence for partial updates.
///
/// `Keep` leaves the stored value untouched. For nullable columns the payload
/// is itself an `Option`, so `Set(None)` clears and `Set(Some(..))` overwrites;
/// clearing notes and leaving notes alone are different operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Patch::Set(_))
    }

    pub fn as_set(&self) -> Option<&T> {
        match self {
            Patch::Set(value) => Some(value),
            Patch::Keep => None,
        }
    }
}

impl<T: Clone> Patch<T> {
    /// Write the value into `target` if present. Returns whether it was.
    pub fn apply(&self, target: &mut T) -> bool {
        match self {
            Patch::Set(value) => {
                *target = value.clone();
                true
            }
            Patch::Keep => false,
        }
    }
}

/// Input for creating an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryCreate {
    pub user_id: i64,
    pub entry_date: NaiveDate,
    pub pain_level: Option<PainLevel>,
    pub pain_score: Option<i32>,
    pub pain_description: Option<String>,
    pub notes: Option<String>,
    pub had_attack: bool,
}

impl EntryCreate {
    /// Bare entry for a user and date.
    pub fn new(user_id: i64, entry_date: NaiveDate) -> Self {
        Self {
            user_id,
            entry_date,
            pain_level: None,
            pain_score: None,
            pain_description: None,
            notes: None,
            had_attack: false,
        }
    }

    /// Validate against the local calendar date.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_on(today())
    }

    /// Validate with an explicit "today".
    pub fn validate_on(&self, today: NaiveDate) -> Result<(), ValidationError> {
        if self.entry_date > today {
            return Err(ValidationError::FutureDate {
                date: self.entry_date,
                today,
            });
        }
        if let Some(score) = self.pain_score {
            check_score("pain_score", score)?;
        }
        check_optional_len(
            "pain_description",
            self.pain_description.as_deref(),
            DESCRIPTION_MAX_LEN,
        )?;
        check_optional_len("notes", self.notes.as_deref(), NOTES_MAX_LEN)?;
        Ok(())
    }
}

/// Partial update for an entry. Every field defaults to [`Patch::Keep`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
    pub pain_level: Patch<Option<PainLevel>>,
    pub pain_score: Patch<Option<i32>>,
    pub pain_description: Patch<Option<String>>,
    pub notes: Patch<Option<String>>,
    pub had_attack: Patch<bool>,
}

impl EntryUpdate {
    pub fn pain_level(level: PainLevel) -> Self {
        Self {
            pain_level: Patch::Set(Some(level)),
            ..Self::default()
        }
    }

    pub fn pain_score(score: i32) -> Self {
        Self {
            pain_score: Patch::Set(Some(score)),
            ..Self::default()
        }
    }

    pub fn pain_description(description: impl Into<String>) -> Self {
        Self {
            pain_description: Patch::Set(Some(description.into())),
            ..Self::default()
        }
    }

    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Patch::Set(Some(notes.into())),
            ..Self::default()
        }
    }

    pub fn had_attack(had_attack: bool) -> Self {
        Self {
            had_attack: Patch::Set(had_attack),
            ..Self::default()
        }
    }

    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        !(self.pain_level.is_set()
            || self.pain_score.is_set()
            || self.pain_description.is_set()
            || self.notes.is_set()
            || self.had_attack.is_set())
    }

    /// Bounds apply only to fields that are present.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(Some(score)) = self.pain_score.as_set() {
            check_score("pain_score", *score)?;
        }
        if let Some(description) = self.pain_description.as_set() {
            check_optional_len("pain_description", description.as_deref(), DESCRIPTION_MAX_LEN)?;
        }
        if let Some(notes) = self.notes.as_set() {
            check_optional_len("notes", notes.as_deref(), NOTES_MAX_LEN)?;
        }
        Ok(())
    }

    /// Overwrite the supplied fields on `entry`. Returns whether any field was supplied.
    pub fn apply_to(&self, entry: &mut Entry) -> bool {
        let mut touched = self.pain_level.apply(&mut entry.pain_level);
        touched |= self.pain_score.apply(&mut entry.pain_score);
        touched |= self.pain_description.apply(&mut entry.pain_description);
        touched |= self.notes.apply(&mut entry.notes);
        touched |= self.had_attack.apply(&mut entry.had_attack);
        touched
    }
}

/// Input for attaching a medication to an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MedicationCreate {
    pub entry_id: i64,
    pub name: String,
    pub medication_type: MedicationType,
    pub dosage: Option<String>,
    /// Defaults to the time of insertion
    pub taken_at: Option<DateTime<Utc>>,
}

impl MedicationCreate {
    pub fn new(entry_id: i64, name: impl Into<String>, medication_type: MedicationType) -> Self {
        Self {
            entry_id,
            name: name.into(),
            medication_type,
            dosage: None,
            taken_at: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("name", &self.name, NAME_MAX_LEN)?;
        check_optional_len("dosage", self.dosage.as_deref(), DOSAGE_MAX_LEN)?;
        Ok(())
    }
}

/// Input for attaching a symptom to an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SymptomCreate {
    pub entry_id: i64,
    pub name: String,
    pub severity: Option<i32>,
}

impl SymptomCreate {
    pub fn new(entry_id: i64, name: impl Into<String>) -> Self {
        Self {
            entry_id,
            name: name.into(),
            severity: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_required("name", &self.name, NAME_MAX_LEN)?;
        if let Some(severity) = self.severity {
            check_score("severity", severity)?;
        }
        Ok(())
    }
}
