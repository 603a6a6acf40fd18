// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Kupona redemption bot.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a
//! single-writer concurrency model via `tokio-rusqlite`, typed operations
//! for the code ledger and user directory, and the filesystem blob sink
//! for code images. The legacy availability-flag schema is rebuilt to the
//! quantity schema on open.

pub mod adapter;
pub mod blobs;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use adapter::SqliteStorage;
pub use blobs::FsBlobSink;
pub use database::Database;
pub use models::*;
