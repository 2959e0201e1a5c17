//! Diary entry database operations.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{
    format_date, format_timestamp, is_unique_violation, now_stored, parse_date, parse_timestamp,
    DbError, DbResult, Session,
};
use crate::models::{Entry, EntryCreate, EntryUpdate, PainLevel};

const ENTRY_COLUMNS: &str = "id, user_id, entry_date, pain_level, pain_score, pain_description, \
                             notes, had_attack, created_at, updated_at";

impl Session<'_> {
    /// Create an entry. Fails with `Conflict` if the user already has one for that date.
    pub fn create_entry(&self, data: &EntryCreate) -> DbResult<Entry> {
        data.validate()?;
        if !self.user_exists(data.user_id)? {
            return Err(DbError::NotFound(format!("user {}", data.user_id)));
        }

        let now = format_timestamp(&now_stored()?);
        let result = self.conn().execute(
            r#"
            INSERT INTO entries (
                user_id, entry_date, pain_level, pain_score, pain_description,
                notes, had_attack, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
            "#,
            params![
                data.user_id,
                format_date(&data.entry_date),
                data.pain_level.map(|level| level.as_str()),
                data.pain_score,
                data.pain_description,
                data.notes,
                data.had_attack,
                now,
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(
                    user_id = data.user_id,
                    entry_date = %data.entry_date,
                    "duplicate entry rejected"
                );
                return Err(DbError::Conflict(format!(
                    "entry for user {} on {} already exists",
                    data.user_id, data.entry_date
                )));
            }
            Err(e) => return Err(e.into()),
        }

        let id = self.conn().last_insert_rowid();
        tracing::debug!(entry_id = id, user_id = data.user_id, "created entry");
        self.get_entry_by_id(id)?
            .ok_or_else(|| DbError::NotFound(format!("entry {}", id)))
    }

    /// Get an entry by ID.
    pub fn get_entry_by_id(&self, entry_id: i64) -> DbResult<Option<Entry>> {
        let sql = format!("SELECT {} FROM entries WHERE id = ?", ENTRY_COLUMNS);
        self.conn()
            .query_row(&sql, [entry_id], EntryRow::from_row)
            .optional()?
            .map(Entry::try_from)
            .transpose()
    }

    /// Get a user's entry for a calendar date.
    pub fn get_entry(&self, user_id: i64, entry_date: NaiveDate) -> DbResult<Option<Entry>> {
        let sql = format!(
            "SELECT {} FROM entries WHERE user_id = ?1 AND entry_date = ?2",
            ENTRY_COLUMNS
        );
        self.conn()
            .query_row(
                &sql,
                params![user_id, format_date(&entry_date)],
                EntryRow::from_row,
            )
            .optional()?
            .map(Entry::try_from)
            .transpose()
    }

    /// Apply a partial update. Returns `None` if the entry does not exist.
    ///
    /// Supplied fields overwrite, others are left alone. `updated_at` is
    /// refreshed whenever at least one field is supplied.
    pub fn update_entry(&self, entry_id: i64, update: &EntryUpdate) -> DbResult<Option<Entry>> {
        update.validate()?;

        let Some(mut entry) = self.get_entry_by_id(entry_id)? else {
            return Ok(None);
        };
        if !update.apply_to(&mut entry) {
            return Ok(Some(entry));
        }

        entry.updated_at = now_stored()?;
        self.conn().execute(
            r#"
            UPDATE entries SET
                pain_level = ?2,
                pain_score = ?3,
                pain_description = ?4,
                notes = ?5,
                had_attack = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
            params![
                entry.id,
                entry.pain_level.map(|level| level.as_str()),
                entry.pain_score,
                entry.pain_description,
                entry.notes,
                entry.had_attack,
                format_timestamp(&entry.updated_at),
            ],
        )?;
        tracing::debug!(entry_id, "updated entry");
        Ok(Some(entry))
    }

    /// Page through a user's entries, most recent date first.
    pub fn list_entries(&self, user_id: i64, limit: u32, offset: u32) -> DbResult<Vec<Entry>> {
        let sql = format!(
            r#"
            SELECT {} FROM entries
            WHERE user_id = ?1
            ORDER BY entry_date DESC
            LIMIT ?2 OFFSET ?3
            "#,
            ENTRY_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, limit, offset], EntryRow::from_row)?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }

    /// Entries dated within `[start_date, end_date]`, most recent first.
    pub fn list_entries_in_range(
        &self,
        user_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> DbResult<Vec<Entry>> {
        let sql = format!(
            r#"
            SELECT {} FROM entries
            WHERE user_id = ?1 AND entry_date >= ?2 AND entry_date <= ?3
            ORDER BY entry_date DESC
            "#,
            ENTRY_COLUMNS
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let rows = stmt.query_map(
            params![user_id, format_date(&start_date), format_date(&end_date)],
            EntryRow::from_row,
        )?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.try_into()?);
        }
        Ok(entries)
    }

    /// Number of entries a user has.
    pub fn count_entries(&self, user_id: i64) -> DbResult<u64> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM entries WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Delete an entry together with its medications and symptoms.
    pub fn delete_entry(&self, entry_id: i64) -> DbResult<bool> {
        let medications = self
            .conn()
            .execute("DELETE FROM medications WHERE entry_id = ?", [entry_id])?;
        let symptoms = self
            .conn()
            .execute("DELETE FROM symptoms WHERE entry_id = ?", [entry_id])?;
        let rows_affected = self
            .conn()
            .execute("DELETE FROM entries WHERE id = ?", [entry_id])?;

        if rows_affected > 0 {
            tracing::debug!(entry_id, medications, symptoms, "deleted entry");
        }
        Ok(rows_affected > 0)
    }

    pub(crate) fn entry_exists(&self, entry_id: i64) -> DbResult<bool> {
        let found = self
            .conn()
            .query_row("SELECT 1 FROM entries WHERE id = ?", [entry_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

/// Raw entry row as stored.
struct EntryRow {
    id: i64,
    user_id: i64,
    entry_date: String,
    pain_level: Option<String>,
    pain_score: Option<i32>,
    pain_description: Option<String>,
    notes: Option<String>,
    had_attack: bool,
    created_at: String,
    updated_at: String,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            entry_date: row.get(2)?,
            pain_level: row.get(3)?,
            pain_score: row.get(4)?,
            pain_description: row.get(5)?,
            notes: row.get(6)?,
            had_attack: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }
}

impl TryFrom<EntryRow> for Entry {
    type Error = DbError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let pain_level = row
            .pain_level
            .as_deref()
            .map(str::parse::<PainLevel>)
            .transpose()
            .map_err(|e| DbError::InvalidRow(e.to_string()))?;

        Ok(Entry {
            id: row.id,
            user_id: row.user_id,
            entry_date: parse_date(&row.entry_date)?,
            pain_level,
            pain_score: row.pain_score,
            pain_description: row.pain_description,
            notes: row.notes,
            had_attack: row.had_attack,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}
