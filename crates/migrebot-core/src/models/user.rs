//! Diary user models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{
    check_optional_len, check_time_of_day, ValidationError, DISPLAY_NAME_MAX_LEN,
};

/// A diary owner, bound to exactly one external chat account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Internal row ID
    pub id: i64,
    /// Chat-network account ID (unique, immutable)
    pub external_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Reminder time in `HH:MM`
    pub notification_time: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Best human-readable name available.
    pub fn display_name(&self) -> Option<&str> {
        self.first_name
            .as_deref()
            .or(self.username.as_deref())
            .or(self.last_name.as_deref())
    }
}

/// Display fields supplied by the transport on first contact.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UserProfile {
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_optional_len("username", self.username.as_deref(), DISPLAY_NAME_MAX_LEN)?;
        check_optional_len("first_name", self.first_name.as_deref(), DISPLAY_NAME_MAX_LEN)?;
        check_optional_len("last_name", self.last_name.as_deref(), DISPLAY_NAME_MAX_LEN)?;
        Ok(())
    }
}

/// Validate an optional reminder time.
pub fn validate_notification_time(value: Option<&str>) -> Result<(), ValidationError> {
    match value {
        Some(time) => check_time_of_day("notification_time", time),
        None => Ok(()),
    }
}
