//! Tracing setup for the bot binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with a configured default level.
///
/// `RUST_LOG` still takes precedence. Output is the compact formatter.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

/// Route logs to the test harness; safe to call from every test.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new("debug"))
        .try_init();
}
