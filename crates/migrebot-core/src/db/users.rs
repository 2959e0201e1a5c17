//! User database operations.

use rusqlite::{params, OptionalExtension, Row};

use super::{format_timestamp, now_stored, parse_timestamp, DbError, DbResult, Session};
use crate::models::{validate_notification_time, User, UserProfile};

const USER_COLUMNS: &str = "id, external_id, username, first_name, last_name, \
                            notification_time, created_at, updated_at";

impl Session<'_> {
    /// Resolve a user by external account ID, creating the row on first contact.
    ///
    /// Concurrent first contacts for the same account converge on one row: the
    /// insert is a no-op when the account already exists.
    pub fn get_or_create_user(&self, external_id: i64, profile: &UserProfile) -> DbResult<User> {
        if let Some(user) = self.get_user_by_external_id(external_id)? {
            return Ok(user);
        }

        profile.validate()?;
        let now = format_timestamp(&now_stored()?);
        let inserted = self.conn().execute(
            r#"
            INSERT INTO users (
                external_id, username, first_name, last_name, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (external_id) DO NOTHING
            "#,
            params![
                external_id,
                profile.username,
                profile.first_name,
                profile.last_name,
                now,
            ],
        )?;
        if inserted > 0 {
            tracing::debug!(external_id, "created user");
        }

        self.get_user_by_external_id(external_id)?
            .ok_or_else(|| DbError::NotFound(format!("user with external id {}", external_id)))
    }

    /// Get a user by external account ID.
    pub fn get_user_by_external_id(&self, external_id: i64) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE external_id = ?", USER_COLUMNS);
        self.conn()
            .query_row(&sql, [external_id], UserRow::from_row)
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    /// Get a user by internal ID.
    pub fn get_user(&self, user_id: i64) -> DbResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        self.conn()
            .query_row(&sql, [user_id], UserRow::from_row)
            .optional()?
            .map(User::try_from)
            .transpose()
    }

    /// Set or clear the reminder time. Returns `None` if the user does not exist.
    pub fn set_notification_time(
        &self,
        user_id: i64,
        notification_time: Option<&str>,
    ) -> DbResult<Option<User>> {
        validate_notification_time(notification_time)?;
        let now = format_timestamp(&now_stored()?);
        let rows_affected = self.conn().execute(
            "UPDATE users SET notification_time = ?2, updated_at = ?3 WHERE id = ?1",
            params![user_id, notification_time, now],
        )?;
        if rows_affected == 0 {
            return Ok(None);
        }
        self.get_user(user_id)
    }

    pub(crate) fn user_exists(&self, user_id: i64) -> DbResult<bool> {
        let found = self
            .conn()
            .query_row("SELECT 1 FROM users WHERE id = ?", [user_id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }
}

/// Raw user row as stored.
struct UserRow {
    id: i64,
    external_id: i64,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    notification_time: Option<String>,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            external_id: row.get(1)?,
            username: row.get(2)?,
            first_name: row.get(3)?,
            last_name: row.get(4)?,
            notification_time: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            external_id: row.external_id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            notification_time: row.notification_time,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}
