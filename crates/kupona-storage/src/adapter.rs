// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the storage adapter and the domain seams.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use kupona_config::model::StorageConfig;
use kupona_core::types::{CodeRecord, UserIdentity};
use kupona_core::{
    AdapterType, CodeLedger, HealthStatus, KuponaError, PluginAdapter, StorageAdapter,
    UserDirectory,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`]. One value serves as both the
/// [`CodeLedger`] and the [`UserDirectory`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until [`StorageAdapter::initialize`]
    /// is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, KuponaError> {
        self.db.get().ok_or_else(|| KuponaError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, KuponaError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), KuponaError> {
        // Shutdown delegates to close if the DB was initialized.
        if let Some(db) = self.db.get() {
            db.close().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), KuponaError> {
        let db = Database::open(&self.config.database_path).await?;
        self.db.set(db).map_err(|_| KuponaError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), KuponaError> {
        self.db()?.close().await
    }
}

#[async_trait]
impl CodeLedger for SqliteStorage {
    async fn lookup(&self, code: &str) -> Result<Option<CodeRecord>, KuponaError> {
        queries::codes::lookup(self.db()?, code).await
    }

    async fn create(
        &self,
        code: &str,
        description: &str,
        quantity: i64,
    ) -> Result<(), KuponaError> {
        queries::codes::create(self.db()?, code, description, quantity).await
    }

    async fn decrement_if_available(&self, code: &str) -> Result<bool, KuponaError> {
        queries::codes::decrement_if_available(self.db()?, code).await
    }

    async fn set_quantity(&self, code: &str, quantity: i64) -> Result<(), KuponaError> {
        queries::codes::set_quantity(self.db()?, code, quantity).await
    }
}

#[async_trait]
impl UserDirectory for SqliteStorage {
    async fn upsert_user(&self, user: &UserIdentity) -> Result<(), KuponaError> {
        queries::users::upsert_user(self.db()?, user).await
    }
}
