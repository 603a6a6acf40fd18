// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Action log trait for the per-user audit trail.

use async_trait::async_trait;

use crate::types::UserIdentity;

/// Write-only action log recording what each user did.
///
/// Fire-and-forget: implementations swallow their own write failures
/// (reporting them via `tracing`) so a broken log file can never fail a
/// dialogue turn.
#[async_trait]
pub trait ActionLog: Send + Sync {
    async fn record(&self, user: &UserIdentity, message: &str);
}
