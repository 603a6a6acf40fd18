// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and sane dialogue policy values.

use thiserror::Error;

use crate::model::KuponaConfig;

/// A configuration error, either from Figment extraction or validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment failed to parse or merge the configuration sources.
    #[error("{0}")]
    Figment(#[from] figment::Error),

    /// A semantic constraint on a deserialized value failed.
    #[error("{message}")]
    Validation { message: String },
}

/// Render a list of configuration errors to stderr.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("error: {error}");
    }
    eprintln!(
        "\nConfiguration is read from ./kupona.toml, ~/.config/kupona/kupona.toml, \
         /etc/kupona/kupona.toml, and KUPONA_* environment variables."
    );
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &KuponaConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.media_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.media_dir must not be empty".to_string(),
        });
    }

    if config.audit.log_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "audit.log_dir must not be empty".to_string(),
        });
    }

    if config.dialogue.min_images < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "dialogue.min_images must be at least 1, got {}",
                config.dialogue.min_images
            ),
        });
    }

    if config.dialogue.session_idle_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "dialogue.session_idle_secs must be positive".to_string(),
        });
    }

    for (i, admin) in config.telegram.admin_users.iter().enumerate() {
        if admin.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("telegram.admin_users[{i}] must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::KuponaConfig;

    #[test]
    fn default_config_validates() {
        let config = KuponaConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn empty_database_path_is_rejected() {
        let mut config = KuponaConfig::default();
        config.storage.database_path = "  ".into();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("database_path")));
    }

    #[test]
    fn zero_min_images_is_rejected() {
        let mut config = KuponaConfig::default();
        config.dialogue.min_images = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = KuponaConfig::default();
        config.storage.database_path = "".into();
        config.storage.media_dir = "".into();
        config.dialogue.session_idle_secs = 0;
        config.telegram.admin_users = vec!["".into()];
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
    }
}
