// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Kupona redemption bot.

use thiserror::Error;

/// The primary error type used across all Kupona adapter traits and core operations.
///
/// Validation failures, unknown codes, and exhausted codes are *not* errors:
/// the dialogues handle those as ordinary replies. This type covers the
/// faults that either propagate to the surrounding process (storage, blob
/// sink, transport) or carry a typed recovery path (`DuplicateCode`).
#[derive(Debug, Error)]
pub enum KuponaError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, migration).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, message delivery, file download).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Blob sink errors (image persistence failure).
    #[error("blob sink error: {source}")]
    Blob {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A ledger insert collided with an existing code.
    ///
    /// The intake dialogue recovers from this locally by re-prompting for a
    /// different code; it is never surfaced to the end user as a fault.
    #[error("code `{code}` already exists in the ledger")]
    DuplicateCode { code: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
