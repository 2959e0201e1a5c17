//! Symptom database operations.

use rusqlite::params;

use super::{DbError, DbResult, Session};
use crate::models::{Symptom, SymptomCreate};

impl Session<'_> {
    /// Attach a symptom to an entry.
    pub fn create_symptom(&self, data: &SymptomCreate) -> DbResult<Symptom> {
        data.validate()?;
        if !self.entry_exists(data.entry_id)? {
            return Err(DbError::NotFound(format!("entry {}", data.entry_id)));
        }

        self.conn().execute(
            "INSERT INTO symptoms (entry_id, name, severity) VALUES (?1, ?2, ?3)",
            params![data.entry_id, data.name, data.severity],
        )?;

        let id = self.conn().last_insert_rowid();
        tracing::debug!(symptom_id = id, entry_id = data.entry_id, "created symptom");
        Ok(Symptom {
            id,
            entry_id: data.entry_id,
            name: data.name.clone(),
            severity: data.severity,
        })
    }

    /// Symptoms of an entry in insertion order.
    pub fn list_symptoms(&self, entry_id: i64) -> DbResult<Vec<Symptom>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, entry_id, name, severity FROM symptoms WHERE entry_id = ? ORDER BY id",
        )?;

        let rows = stmt.query_map([entry_id], |row| {
            Ok(Symptom {
                id: row.get(0)?,
                entry_id: row.get(1)?,
                name: row.get(2)?,
                severity: row.get(3)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }
}
