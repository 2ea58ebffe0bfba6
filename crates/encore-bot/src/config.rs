use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use encore_finder::GuildRoster;
use encore_menu::DEFAULT_MAX_MENU_OPTIONS;
use serde::{Deserialize, Serialize};

use crate::queue::QueueEntry;

pub const BOT_CONFIG_SCHEMA_VERSION: u32 = 1;
pub const BOT_CONFIG_FILE_NAME: &str = "encore-bot.json";
pub const MAX_MENU_OPTIONS_LIMIT: usize = 10;

const DEFAULT_PREFIX: &str = "!";
const DEFAULT_SELECTION_TIMEOUT_MS: u64 = 60_000;

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_selection_timeout_ms() -> u64 {
    DEFAULT_SELECTION_TIMEOUT_MS
}

fn default_max_menu_options() -> usize {
    DEFAULT_MAX_MENU_OPTIONS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `BotConfig` used across encore components.
pub struct BotConfig {
    pub schema_version: u32,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_selection_timeout_ms")]
    pub selection_timeout_ms: u64,
    #[serde(default = "default_max_menu_options")]
    pub max_menu_options: usize,
    #[serde(default)]
    pub console_author_id: u64,
    #[serde(default)]
    pub console_channel_id: u64,
    #[serde(default)]
    pub roster: GuildRoster,
    #[serde(default)]
    pub catalog: Vec<String>,
    #[serde(default)]
    pub queue: Vec<QueueEntry>,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            schema_version: BOT_CONFIG_SCHEMA_VERSION,
            prefix: default_prefix(),
            selection_timeout_ms: DEFAULT_SELECTION_TIMEOUT_MS,
            max_menu_options: DEFAULT_MAX_MENU_OPTIONS,
            console_author_id: 0,
            console_channel_id: 0,
            roster: GuildRoster::default(),
            catalog: Vec::new(),
            queue: Vec::new(),
        }
    }
}

impl BotConfig {
    pub fn selection_timeout(&self) -> Duration {
        Duration::from_millis(self.selection_timeout_ms)
    }
}

/// Loads the bot configuration; a missing file yields the defaults.
pub fn load_bot_config(path: &Path) -> Result<BotConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "bot config not found, using defaults");
        return Ok(BotConfig::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bot config {}", path.display()))?;
    let parsed = serde_json::from_str::<BotConfig>(&raw)
        .with_context(|| format!("failed to parse bot config {}", path.display()))?;
    validate_bot_config(&parsed)?;
    Ok(parsed)
}

pub fn validate_bot_config(config: &BotConfig) -> Result<()> {
    if config.schema_version != BOT_CONFIG_SCHEMA_VERSION {
        bail!(
            "unsupported bot config schema_version {} (expected {})",
            config.schema_version,
            BOT_CONFIG_SCHEMA_VERSION
        );
    }
    if config.prefix.trim().is_empty() {
        bail!("bot config prefix must not be empty");
    }
    if config.selection_timeout_ms == 0 {
        bail!("bot config selection_timeout_ms must be greater than 0");
    }
    if !(1..=MAX_MENU_OPTIONS_LIMIT).contains(&config.max_menu_options) {
        bail!(
            "bot config max_menu_options must be between 1 and {MAX_MENU_OPTIONS_LIMIT} (got {})",
            config.max_menu_options
        );
    }
    Ok(())
}
