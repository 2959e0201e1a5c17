//! Command dispatch.
//!
//! One inbound message is one command: resolve the sender, parse the text,
//! run the matching diary operation and render a reply. Failures become
//! replies; nothing here can take the process down.

use std::sync::Arc;
use std::time::{Duration, Instant};

use migrebot_core::export::DEFAULT_WINDOW_DAYS;
use migrebot_core::models::today;
use migrebot_core::{
    Cache, CacheExt, Diary, DiaryError, DiaryResult, EntryUpdate, ExportFile, User, UserProfile,
};
use uuid::Uuid;

use crate::commands::{parse_command, Command, CommandError};
use crate::replies;

/// How many entries `/recent` shows.
pub const RECENT_LIMIT: u32 = 10;

/// One message from the transport.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub external_id: i64,
    pub profile: UserProfile,
    pub text: String,
}

impl Inbound {
    pub fn new(external_id: i64, profile: UserProfile, text: impl Into<String>) -> Self {
        Self {
            external_id,
            profile,
            text: text.into(),
        }
    }
}

/// What the transport should send back.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Document { file: ExportFile, caption: String },
}

impl Reply {
    pub fn text(&self) -> &str {
        match self {
            Reply::Text(text) => text,
            Reply::Document { caption, .. } => caption,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerSettings {
    /// Days covered by `/export`
    pub export_days: u32,
    /// Lifetime of cached users; `None` disables caching
    pub user_ttl: Option<Duration>,
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self {
            export_days: DEFAULT_WINDOW_DAYS,
            user_ttl: Some(Duration::from_secs(300)),
        }
    }
}

/// Routes commands onto the diary.
#[derive(Clone)]
pub struct Handler {
    diary: Diary,
    cache: Arc<dyn Cache>,
    settings: HandlerSettings,
}

impl Handler {
    pub fn new(diary: Diary, cache: Arc<dyn Cache>, settings: HandlerSettings) -> Self {
        Self {
            diary,
            cache,
            settings,
        }
    }

    /// Handle one message. Returns `None` for text that is not a command.
    pub fn handle(&self, inbound: &Inbound) -> Option<Reply> {
        let trace_id = Uuid::new_v4().simple().to_string();
        let started = Instant::now();

        let (kind, reply) = match parse_command(&inbound.text) {
            Err(CommandError::NotACommand) => ("text", None),
            Err(e) => ("invalid", Some(Reply::Text(replies::command_error(&e)))),
            Ok(command) => {
                let reply = self
                    .resolve_user(inbound)
                    .and_then(|user| self.dispatch(&user, &command))
                    .unwrap_or_else(|e| {
                        if matches!(e, DiaryError::Storage(_) | DiaryError::Export(_)) {
                            tracing::error!(trace_id = %trace_id, error = %e, "command failed");
                        }
                        Reply::Text(replies::diary_error(&e))
                    });
                (command.name(), Some(reply))
            }
        };

        tracing::info!(
            trace_id = %trace_id,
            update_type = kind,
            user_id = inbound.external_id,
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "handled update"
        );
        reply
    }

    /// Look the sender up in the cache, falling back to the store.
    fn resolve_user(&self, inbound: &Inbound) -> DiaryResult<User> {
        let key = format!("user:{}", inbound.external_id);

        if self.settings.user_ttl.is_some() {
            match self.cache.get_json::<User>(&key) {
                Ok(Some(user)) => return Ok(user),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "dropping unreadable cache entry");
                    self.cache.delete(&key);
                }
            }
        }

        let user = self
            .diary
            .resolve_user(inbound.external_id, &inbound.profile)?;

        if let Some(ttl) = self.settings.user_ttl {
            if let Err(e) = self.cache.set_json(&key, &user, Some(ttl)) {
                tracing::warn!(key = %key, error = %e, "could not cache user");
            }
        }
        Ok(user)
    }

    fn dispatch(&self, user: &User, command: &Command) -> DiaryResult<Reply> {
        let today = today();
        let text = match command {
            Command::Start => replies::start_text(user.display_name()),
            Command::Help => replies::HELP_TEXT.to_string(),
            Command::Headache => {
                let entry = self.diary.entry_for_date(user.id, today)?;
                replies::headache_summary(entry.as_ref())
            }
            Command::Entry => {
                let entry = self.diary.create_today_entry(user.id)?;
                replies::entry_created(entry.entry_date)
            }
            Command::Today => match self.diary.entry_details(user.id, today)? {
                Some(details) => replies::entry_details(&details),
                None => replies::NO_ENTRY_TODAY.to_string(),
            },
            Command::Edit => match self.diary.entry_for_date(user.id, today)? {
                Some(_) => replies::EDIT_HINTS.to_string(),
                None => replies::NO_ENTRY_TO_EDIT.to_string(),
            },
            Command::SetPain(level) => {
                self.update_today(user, &EntryUpdate::pain_level(*level))?;
                replies::pain_level_set(*level)
            }
            Command::SetScore(score) => {
                self.update_today(user, &EntryUpdate::pain_score(*score))?;
                replies::pain_score_set(*score)
            }
            Command::SetPainDescription(description) => {
                self.update_today(user, &EntryUpdate::pain_description(description.as_str()))?;
                replies::PAIN_DESCRIPTION_UPDATED.to_string()
            }
            Command::SetNotes(notes) => {
                self.update_today(user, &EntryUpdate::notes(notes.as_str()))?;
                replies::NOTES_UPDATED.to_string()
            }
            Command::SetAttack => {
                self.update_today(user, &EntryUpdate::had_attack(true))?;
                replies::ATTACK_MARKED.to_string()
            }
            Command::AddMedication {
                medication_type,
                name,
                dosage,
            } => {
                let medication = self.diary.add_medication_for_date(
                    user.id,
                    today,
                    name,
                    *medication_type,
                    dosage.as_deref(),
                )?;
                replies::medication_added(&medication.name)
            }
            Command::AddSymptom { name, severity } => {
                let symptom = self
                    .diary
                    .add_symptom_for_date(user.id, today, name, *severity)?;
                replies::symptom_added(&symptom.name)
            }
            Command::Recent => {
                let entries = self.diary.recent_entries(user.id, RECENT_LIMIT)?;
                replies::recent_entries(&entries)
            }
            Command::Export(format) => {
                let file = self
                    .diary
                    .export_recent(user.id, *format, self.settings.export_days)?;
                if file.entry_count == 0 {
                    replies::no_entries_in_window(self.settings.export_days)
                } else {
                    let caption = replies::export_caption(&file);
                    return Ok(Reply::Document { file, caption });
                }
            }
        };
        Ok(Reply::Text(text))
    }

    fn update_today(&self, user: &User, update: &EntryUpdate) -> DiaryResult<()> {
        self.diary.update_entry_for_date(user.id, today(), update)?;
        Ok(())
    }
}
