// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Kupona redemption bot.
//!
//! This crate provides the foundational trait definitions, error type, and
//! common types used throughout the Kupona workspace. The chat transport,
//! persistence layer, blob sink, and action log all implement traits
//! defined here, so the dialogues can be tested against in-memory fakes.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::KuponaError;
pub use types::{AdapterType, CodeRecord, HealthStatus, InboundEvent, OutboundResponse};

// Re-export all adapter traits at crate root.
pub use traits::{
    ActionLog, BlobSink, ChannelAdapter, CodeLedger, PluginAdapter, StorageAdapter, UserDirectory,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kupona_error_has_all_variants() {
        let _config = KuponaError::Config("test".into());
        let _storage = KuponaError::Storage {
            source: Box::new(std::io::Error::other("test")),
        };
        let _channel = KuponaError::Channel {
            message: "test".into(),
            source: None,
        };
        let _blob = KuponaError::Blob {
            source: Box::new(std::io::Error::other("test")),
        };
        let _dup = KuponaError::DuplicateCode {
            code: "0000".into(),
        };
        let _internal = KuponaError::Internal("test".into());
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // Verifies that every adapter trait compiles and is accessible
        // through the public API.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_storage_adapter<T: StorageAdapter>() {}
        fn _assert_code_ledger<T: CodeLedger>() {}
        fn _assert_user_directory<T: UserDirectory>() {}
        fn _assert_blob_sink<T: BlobSink>() {}
        fn _assert_action_log<T: ActionLog>() {}
    }
}
