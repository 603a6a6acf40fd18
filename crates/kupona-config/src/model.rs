// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Kupona redemption bot.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Kupona configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KuponaConfig {
    /// Bot identity and logging settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Telegram bot integration settings.
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Action log settings.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Dialogue policy settings.
    #[serde(default)]
    pub dialogue: DialogueConfig,
}

/// Bot identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the bot.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "kupona".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot API token from @BotFather. Required for the Telegram adapter.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Operators allowed to register new codes, by numeric user ID or
    /// @username. End-user redemption is open to everyone.
    #[serde(default)]
    pub admin_users: Vec<String>,
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory for stored code images.
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            media_dir: default_media_dir(),
        }
    }
}

fn default_database_path() -> String {
    "kupona.db".to_string()
}

fn default_media_dir() -> String {
    "media".to_string()
}

/// Action log configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Directory for the per-user action log file.
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_dir() -> String {
    "logs".to_string()
}

/// Dialogue policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DialogueConfig {
    /// Minimum number of images the intake dialogue collects per code.
    #[serde(default = "default_min_images")]
    pub min_images: u32,

    /// Inactivity window after which abandoned dialogue sessions are evicted.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,

    /// Whether a successful redemption lookup also consumes one unit.
    ///
    /// Defaults to `false`: the reply reports availability without
    /// decrementing, matching the historical behavior. Flip to `true` to
    /// make redemption consume a unit in the same turn.
    #[serde(default)]
    pub consume_on_redeem: bool,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            min_images: default_min_images(),
            session_idle_secs: default_session_idle_secs(),
            consume_on_redeem: false,
        }
    }
}

fn default_min_images() -> u32 {
    3
}

fn default_session_idle_secs() -> u64 {
    1800
}
