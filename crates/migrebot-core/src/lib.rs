//! Migrebot Core Library
//!
//! Personal headache diary: one entry per user per calendar day, with
//! medications and symptoms attached, exportable as CSV or XLSX.
//!
//! # Architecture
//!
//! ```text
//! Transport command ──► Diary::run ──► Session (BEGIN IMMEDIATE)
//!                                          │
//!                        ┌─────────────────┼──────────────────┐
//!                        ▼                 ▼                  ▼
//!                      users            entries     medications / symptoms
//!                                          │
//!                                          ▼
//!                              list_entries_in_range
//!                                          │
//!                                          ▼
//!                               ExportFile (csv | xlsx)
//! ```
//!
//! # Core Principle
//!
//! **At most one entry per user per day.** The store enforces it; a losing
//! writer gets a conflict, never an overwrite.
//!
//! # Modules
//!
//! - [`db`]: SQLite repository layer, one transaction per command
//! - [`models`]: Value types, entities and mutation contracts
//! - [`export`]: Deterministic CSV and XLSX encoders
//! - [`cache`]: Injected key-value cache

pub mod cache;
pub mod db;
pub mod export;
pub mod models;

// Re-export commonly used types
pub use cache::{Cache, CacheExt, MemoryCache};
pub use db::{Database, DbError, Session};
pub use export::{ExportError, ExportFile, ExportFormat, ExportWindow};
pub use models::{
    Entry, EntryCreate, EntryDetails, EntryUpdate, Medication, MedicationCreate, MedicationType,
    PainLevel, Patch, Symptom, SymptomCreate, User, UserProfile, ValidationError,
};

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// Error Type
// =========================================================================

/// Failures a command can report back to its caller.
#[derive(Debug, thiserror::Error)]
pub enum DiaryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

pub type DiaryResult<T> = Result<T, DiaryError>;

impl From<DbError> for DiaryError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Validation(e) => DiaryError::Validation(e),
            DbError::Conflict(msg) => DiaryError::Conflict(msg),
            DbError::NotFound(msg) => DiaryError::NotFound(msg),
            other => DiaryError::Storage(other.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for DiaryError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        DiaryError::Storage(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Diary Facade
// =========================================================================

/// Thread-safe handle to the diary store.
///
/// Each public operation is one command: it runs in its own transaction and
/// either commits completely or leaves the store untouched.
#[derive(Clone)]
pub struct Diary {
    db: Arc<Mutex<Database>>,
}

impl Diary {
    /// Open or create a diary database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> DiaryResult<Self> {
        let db = Database::open(path)?;
        Ok(Self::from_database(db))
    }

    /// Create an in-memory diary (for testing).
    pub fn open_in_memory() -> DiaryResult<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self::from_database(db))
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Run `f` as one command.
    pub fn run<T, F>(&self, f: F) -> DiaryResult<T>
    where
        F: FnOnce(&Session<'_>) -> DiaryResult<T>,
    {
        let mut db = self.db.lock()?;
        db.run(f)
    }

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Find the user bound to an external account, creating it on first contact.
    pub fn resolve_user(&self, external_id: i64, profile: &UserProfile) -> DiaryResult<User> {
        self.run(|s| Ok(s.get_or_create_user(external_id, profile)?))
    }

    pub fn set_notification_time(&self, user_id: i64, time: Option<&str>) -> DiaryResult<User> {
        self.run(|s| {
            s.set_notification_time(user_id, time)?
                .ok_or_else(|| DiaryError::NotFound(format!("user {}", user_id)))
        })
    }

    // =========================================================================
    // Entry Operations
    // =========================================================================

    pub fn create_entry(&self, data: &EntryCreate) -> DiaryResult<Entry> {
        self.run(|s| Ok(s.create_entry(data)?))
    }

    /// Create a bare entry for the local calendar date.
    pub fn create_today_entry(&self, user_id: i64) -> DiaryResult<Entry> {
        self.create_entry(&EntryCreate::new(user_id, models::today()))
    }

    pub fn entry_for_date(&self, user_id: i64, date: NaiveDate) -> DiaryResult<Option<Entry>> {
        self.run(|s| Ok(s.get_entry(user_id, date)?))
    }

    /// Entry for a date with its medications and symptoms.
    pub fn entry_details(
        &self,
        user_id: i64,
        date: NaiveDate,
    ) -> DiaryResult<Option<EntryDetails>> {
        self.run(|s| {
            let Some(entry) = s.get_entry(user_id, date)? else {
                return Ok(None);
            };
            let medications = s.list_medications(entry.id)?;
            let symptoms = s.list_symptoms(entry.id)?;
            Ok(Some(EntryDetails {
                entry,
                medications,
                symptoms,
            }))
        })
    }

    /// Apply a partial update to the user's entry for `date`.
    pub fn update_entry_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
        update: &EntryUpdate,
    ) -> DiaryResult<Entry> {
        self.run(|s| {
            let entry = s
                .get_entry(user_id, date)?
                .ok_or_else(|| DiaryError::NotFound(format!("entry for {}", date)))?;
            s.update_entry(entry.id, update)?
                .ok_or_else(|| DiaryError::NotFound(format!("entry {}", entry.id)))
        })
    }

    pub fn add_medication_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
        name: &str,
        medication_type: MedicationType,
        dosage: Option<&str>,
    ) -> DiaryResult<Medication> {
        self.run(|s| {
            let entry = s
                .get_entry(user_id, date)?
                .ok_or_else(|| DiaryError::NotFound(format!("entry for {}", date)))?;
            let mut data = MedicationCreate::new(entry.id, name, medication_type);
            data.dosage = dosage.map(str::to_string);
            Ok(s.create_medication(&data)?)
        })
    }

    pub fn add_symptom_for_date(
        &self,
        user_id: i64,
        date: NaiveDate,
        name: &str,
        severity: Option<i32>,
    ) -> DiaryResult<Symptom> {
        self.run(|s| {
            let entry = s
                .get_entry(user_id, date)?
                .ok_or_else(|| DiaryError::NotFound(format!("entry for {}", date)))?;
            let mut data = SymptomCreate::new(entry.id, name);
            data.severity = severity;
            Ok(s.create_symptom(&data)?)
        })
    }

    /// Most recent entries first.
    pub fn recent_entries(&self, user_id: i64, limit: u32) -> DiaryResult<Vec<Entry>> {
        self.run(|s| Ok(s.list_entries(user_id, limit, 0)?))
    }

    pub fn entry_count(&self, user_id: i64) -> DiaryResult<u64> {
        self.run(|s| Ok(s.count_entries(user_id)?))
    }

    /// Delete the user's entry for `date` and its children.
    pub fn delete_entry_for_date(&self, user_id: i64, date: NaiveDate) -> DiaryResult<bool> {
        self.run(|s| match s.get_entry(user_id, date)? {
            Some(entry) => Ok(s.delete_entry(entry.id)?),
            None => Ok(false),
        })
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Encode the user's entries inside `window`, most recent first.
    pub fn export(
        &self,
        user_id: i64,
        format: ExportFormat,
        window: ExportWindow,
        prefix: &str,
    ) -> DiaryResult<ExportFile> {
        let entries =
            self.run(|s| Ok(s.list_entries_in_range(user_id, window.start, window.end)?))?;
        let file = ExportFile::render(&entries, format, window, prefix)?;

        tracing::info!(
            user_id,
            format = %format,
            entries = file.entry_count,
            digest = %file.digest(),
            "rendered export"
        );
        Ok(file)
    }

    /// Export the last `days` days up to today with the default file prefix.
    pub fn export_recent(
        &self,
        user_id: i64,
        format: ExportFormat,
        days: u32,
    ) -> DiaryResult<ExportFile> {
        let window = ExportWindow::last_days(models::today(), days)?;
        self.export(user_id, format, window, export::DEFAULT_PREFIX)
    }
}
