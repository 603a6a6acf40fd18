// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage traits: backend lifecycle plus the code ledger and user directory seams.

use async_trait::async_trait;

use crate::error::KuponaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CodeRecord, UserIdentity};

/// Adapter for storage and persistence backends.
///
/// Manages the lifecycle of the database connection (migrations on
/// initialize, WAL checkpoint on close).
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (opens the database, runs migrations).
    async fn initialize(&self) -> Result<(), KuponaError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), KuponaError>;
}

/// The durable mapping from code to (description, remaining quantity).
///
/// Quantity never goes negative: the sole redemption mutation path is
/// [`decrement_if_available`](CodeLedger::decrement_if_available), which is
/// a no-op at zero and serialized per code by the implementation.
#[async_trait]
pub trait CodeLedger: Send + Sync {
    /// Pure read. Returns `None` if the code was never created.
    async fn lookup(&self, code: &str) -> Result<Option<CodeRecord>, KuponaError>;

    /// Inserts a new record. Fails with [`KuponaError::DuplicateCode`] if the
    /// code already exists; the existing record is never mutated. Callers
    /// validate `quantity > 0` before calling.
    async fn create(
        &self,
        code: &str,
        description: &str,
        quantity: i64,
    ) -> Result<(), KuponaError>;

    /// Atomically decrements the quantity if it is strictly positive.
    ///
    /// Returns whether a unit was consumed. Missing or exhausted codes are a
    /// no-op, not an error.
    async fn decrement_if_available(&self, code: &str) -> Result<bool, KuponaError>;

    /// Operator reset path: overwrite the remaining quantity of an existing code.
    async fn set_quantity(&self, code: &str, quantity: i64) -> Result<(), KuponaError>;
}

/// The durable write-through log of who interacted.
///
/// Upsert-only: inserts a new profile or overwrites all fields of an
/// existing one. No deletion.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn upsert_user(&self, user: &UserIdentity) -> Result<(), KuponaError>;
}
