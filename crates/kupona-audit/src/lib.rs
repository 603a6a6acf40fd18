// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user action log for the Kupona redemption bot.
//!
//! Every dialogue transition and terminal outcome is recorded as one line
//! in `<log_dir>/actions.log`, carrying the acting user's identity and
//! phone number if known. The log is write-only and fire-and-forget: a
//! broken log file can never fail a dialogue turn.

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{info, warn};

use kupona_core::types::{AdapterType, HealthStatus, UserIdentity};
use kupona_core::{ActionLog, KuponaError, PluginAdapter};

/// Action log appending formatted lines to a file.
///
/// Writes go through a mutex and are whole-line appends, so entries from
/// concurrent users never interleave.
pub struct FileActionLog {
    file: Mutex<tokio::fs::File>,
}

impl FileActionLog {
    /// Open (or create) `<log_dir>/actions.log` in append mode.
    pub async fn new(log_dir: impl AsRef<Path>) -> Result<Self, KuponaError> {
        let dir = log_dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| KuponaError::Internal(format!("cannot create log directory: {e}")))?;

        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("actions.log"))
            .await
            .map_err(|e| KuponaError::Internal(format!("cannot open action log: {e}")))?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// One formatted log line, newline-terminated.
    fn format_line(user: &UserIdentity, message: &str) -> String {
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        let username = match &user.handle {
            Some(handle) => format!("@{handle}"),
            None => "-".to_string(),
        };
        let phone = user.phone.as_deref().unwrap_or("-");
        format!(
            "{timestamp} - USER_ID:{} - NAME:{} - USERNAME:{username} - PHONE:{phone} - MESSAGE:{message}\n",
            user.user_id, user.display_name
        )
    }
}

#[async_trait]
impl ActionLog for FileActionLog {
    async fn record(&self, user: &UserIdentity, message: &str) {
        info!(
            user_id = user.user_id,
            name = %user.display_name,
            username = user.handle.as_deref().unwrap_or("-"),
            phone = user.phone.as_deref().unwrap_or("-"),
            "{message}"
        );

        let line = Self::format_line(user, message);
        let mut file = self.file.lock().await;
        if let Err(e) = file.write_all(line.as_bytes()).await {
            warn!(error = %e, "failed to append action log entry");
        }
    }
}

#[async_trait]
impl PluginAdapter for FileActionLog {
    fn name(&self) -> &str {
        "file-action-log"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::AuditLog
    }

    async fn health_check(&self) -> Result<HealthStatus, KuponaError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KuponaError> {
        let mut file = self.file.lock().await;
        file.flush()
            .await
            .map_err(|e| KuponaError::Internal(format!("cannot flush action log: {e}")))
    }
}
