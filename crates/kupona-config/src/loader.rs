// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kupona.toml` > `~/.config/kupona/kupona.toml` > `/etc/kupona/kupona.toml`
//! with environment variable overrides via `KUPONA_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::KuponaConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kupona/kupona.toml` (system-wide)
/// 3. `~/.config/kupona/kupona.toml` (user XDG config)
/// 4. `./kupona.toml` (local directory)
/// 5. `KUPONA_*` environment variables
pub fn load_config() -> Result<KuponaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KuponaConfig::default()))
        .merge(Toml::file("/etc/kupona/kupona.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("kupona/kupona.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("kupona.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<KuponaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KuponaConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KuponaConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KuponaConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `KUPONA_TELEGRAM_BOT_TOKEN` must map to
/// `telegram.bot_token`, not `telegram.bot.token`.
fn env_provider() -> Env {
    Env::prefixed("KUPONA_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: KUPONA_TELEGRAM_BOT_TOKEN -> "telegram_bot_token"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("telegram_", "telegram.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("audit_", "audit.", 1)
            .replacen("dialogue_", "dialogue.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_load_from_empty_toml() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.agent.name, "kupona");
        assert_eq!(config.agent.log_level, "info");
        assert_eq!(config.storage.database_path, "kupona.db");
        assert_eq!(config.dialogue.min_images, 3);
        assert_eq!(config.dialogue.session_idle_secs, 1800);
        assert!(!config.dialogue.consume_on_redeem);
        assert!(config.telegram.bot_token.is_none());
        assert!(config.telegram.admin_users.is_empty());
    }

    #[test]
    fn toml_values_override_defaults() {
        let config = load_config_from_str(
            r#"
            [telegram]
            bot_token = "123:abc"
            admin_users = ["42", "@operator"]

            [dialogue]
            min_images = 5
            consume_on_redeem = true
            "#,
        )
        .unwrap();
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.admin_users.len(), 2);
        assert_eq!(config.dialogue.min_images, 5);
        assert!(config.dialogue.consume_on_redeem);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = load_config_from_str(
            r#"
            [telegram]
            bot_tokne = "typo"
            "#,
        );
        assert!(result.is_err(), "unknown key should be rejected");
    }

    #[test]
    fn env_var_overrides_toml() {
        // Env provider maps KUPONA_TELEGRAM_BOT_TOKEN -> telegram.bot_token.
        figment::Jail::expect_with(|jail| {
            jail.create_file("kupona.toml", "[telegram]\nbot_token = \"from-toml\"")?;
            jail.set_env("KUPONA_TELEGRAM_BOT_TOKEN", "from-env");
            let config: KuponaConfig = Figment::new()
                .merge(Serialized::defaults(KuponaConfig::default()))
                .merge(Toml::file("kupona.toml"))
                .merge(env_provider())
                .extract()?;
            assert_eq!(config.telegram.bot_token.as_deref(), Some("from-env"));
            Ok(())
        });
    }
}
