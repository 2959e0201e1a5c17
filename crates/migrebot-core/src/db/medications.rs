//! Medication database operations.

use rusqlite::{params, Row};

use super::{format_timestamp, now_stored, parse_timestamp, DbError, DbResult, Session};
use crate::models::{Medication, MedicationCreate, MedicationType};

impl Session<'_> {
    /// Attach a medication to an entry. `taken_at` defaults to now.
    pub fn create_medication(&self, data: &MedicationCreate) -> DbResult<Medication> {
        data.validate()?;
        if !self.entry_exists(data.entry_id)? {
            return Err(DbError::NotFound(format!("entry {}", data.entry_id)));
        }

        let taken_at = match data.taken_at {
            Some(ts) => ts,
            None => now_stored()?,
        };
        self.conn().execute(
            r#"
            INSERT INTO medications (entry_id, name, medication_type, dosage, taken_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                data.entry_id,
                data.name,
                data.medication_type.as_str(),
                data.dosage,
                format_timestamp(&taken_at),
            ],
        )?;

        let id = self.conn().last_insert_rowid();
        tracing::debug!(medication_id = id, entry_id = data.entry_id, "created medication");
        Ok(Medication {
            id,
            entry_id: data.entry_id,
            name: data.name.clone(),
            medication_type: data.medication_type,
            dosage: data.dosage.clone(),
            taken_at: parse_timestamp(&format_timestamp(&taken_at))?,
        })
    }

    /// Medications of an entry in insertion order.
    pub fn list_medications(&self, entry_id: i64) -> DbResult<Vec<Medication>> {
        let mut stmt = self.conn().prepare(
            r#"
            SELECT id, entry_id, name, medication_type, dosage, taken_at
            FROM medications
            WHERE entry_id = ?
            ORDER BY id
            "#,
        )?;

        let rows = stmt.query_map([entry_id], MedicationRow::from_row)?;

        let mut medications = Vec::new();
        for row in rows {
            medications.push(row?.try_into()?);
        }
        Ok(medications)
    }
}

/// Raw medication row as stored.
struct MedicationRow {
    id: i64,
    entry_id: i64,
    name: String,
    medication_type: String,
    dosage: Option<String>,
    taken_at: String,
}

impl MedicationRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            entry_id: row.get(1)?,
            name: row.get(2)?,
            medication_type: row.get(3)?,
            dosage: row.get(4)?,
            taken_at: row.get(5)?,
        })
    }
}

impl TryFrom<MedicationRow> for Medication {
    type Error = DbError;

    fn try_from(row: MedicationRow) -> Result<Self, Self::Error> {
        let medication_type = row
            .medication_type
            .parse::<MedicationType>()
            .map_err(|e| DbError::InvalidRow(e.to_string()))?;

        Ok(Medication {
            id: row.id,
            entry_id: row.entry_id,
            name: row.name,
            medication_type,
            dosage: row.dosage,
            taken_at: parse_timestamp(&row.taken_at)?,
        })
    }
}
