//! Runtime configuration.
//!
//! Values come from command-line flags, then `MIGREBOT_*` environment
//! variables (a `.env` file is loaded first), then defaults.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use migrebot_core::export::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use migrebot_core::UserProfile;

use crate::handler::HandlerSettings;

#[derive(Parser, Debug, Clone)]
#[command(name = "migrebot")]
#[command(about = "Headache diary bot with a console transport", long_about = None)]
pub struct Cli {
    /// SQLite database file
    #[arg(long, env = "MIGREBOT_DATABASE_PATH", default_value = "migrebot.db")]
    pub database_path: PathBuf,

    /// Default log level (RUST_LOG overrides)
    #[arg(long, env = "MIGREBOT_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Directory export files are written to
    #[arg(long, env = "MIGREBOT_EXPORT_DIR", default_value = "exports")]
    pub export_dir: PathBuf,

    /// Days covered by /export
    #[arg(
        long,
        env = "MIGREBOT_EXPORT_DAYS",
        default_value_t = DEFAULT_WINDOW_DAYS,
        value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_WINDOW_DAYS))
    )]
    pub export_days: u32,

    /// Lifetime of cached users; 0 disables caching
    #[arg(long, env = "MIGREBOT_CACHE_TTL_SECS", default_value_t = 300)]
    pub cache_ttl_secs: u64,

    /// External account the console session acts as
    #[arg(long, default_value_t = 1)]
    pub user_id: i64,

    /// Username reported for the console account
    #[arg(long)]
    pub username: Option<String>,

    /// Open the database, report and exit
    #[arg(long)]
    pub check: bool,
}

impl Cli {
    /// Load `.env`, then parse flags and environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::parse()
    }

    pub fn settings(&self) -> HandlerSettings {
        HandlerSettings {
            export_days: self.export_days,
            user_ttl: (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs)),
        }
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            ..UserProfile::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let cli = Cli::try_parse_from([
            "migrebot",
            "--database-path",
            "/tmp/diary.db",
            "--export-days",
            "14",
            "--cache-ttl-secs",
            "60",
            "--user-id",
            "4242",
            "--username",
            "anna",
        ])
        .unwrap();

        assert_eq!(cli.database_path, PathBuf::from("/tmp/diary.db"));
        assert_eq!(cli.user_id, 4242);
        assert_eq!(cli.profile().username.as_deref(), Some("anna"));

        let settings = cli.settings();
        assert_eq!(settings.export_days, 14);
        assert_eq!(settings.user_ttl, Some(Duration::from_secs(60)));
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cli = Cli::try_parse_from(["migrebot", "--cache-ttl-secs", "0"]).unwrap();
        assert_eq!(cli.settings().user_ttl, None);
    }

    #[test]
    fn test_rejects_bad_number() {
        assert!(Cli::try_parse_from(["migrebot", "--export-days", "month"]).is_err());
    }

    #[test]
    fn test_export_days_bounded() {
        assert!(Cli::try_parse_from(["migrebot", "--export-days", "200000000"]).is_err());
        assert!(Cli::try_parse_from(["migrebot", "--export-days", "0"]).is_err());
        let cli = Cli::try_parse_from(["migrebot", "--export-days", "3650"]).unwrap();
        assert_eq!(cli.settings().export_days, MAX_WINDOW_DAYS);
    }
}
