//! Migrebot command transport.
//!
//! Turns slash-command messages into diary operations and renders the
//! outcome as Russian reply text or an export document.
//!
//! # Modules
//!
//! - [`commands`]: Slash-command parser
//! - [`handler`]: Per-message dispatch, user cache and trace logging
//! - [`replies`]: Reply texts
//! - [`config`]: Flags and `MIGREBOT_*` environment
//! - [`logging`]: Tracing subscriber setup

pub mod commands;
pub mod config;
pub mod handler;
pub mod logging;
pub mod replies;

pub use commands::{parse_command, Command, CommandError};
pub use config::Cli;
pub use handler::{Handler, HandlerSettings, Inbound, Reply};
