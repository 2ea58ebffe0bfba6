//! Console-driven music queue bot built on the encore finder, waiter, and
//! menu crates.

pub mod catalog;
pub mod commands;
pub mod config;
pub mod console;
pub mod context;
pub mod queue;

#[cfg(test)]
pub(crate) mod test_support;

pub use catalog::{Track, TrackCatalog};
pub use commands::{format_username, render_help, run_command, Checkpoint, Command};
pub use config::{
    load_bot_config, validate_bot_config, BotConfig, BOT_CONFIG_FILE_NAME,
    BOT_CONFIG_SCHEMA_VERSION,
};
pub use console::{parse_console_line, run_console, ConsoleInput, ConsoleReplier};
pub use context::{BotContext, Replier};
pub use queue::{QueueEntry, TrackQueue};
