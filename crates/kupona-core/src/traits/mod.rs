// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.

pub mod adapter;
pub mod audit;
pub mod blob;
pub mod channel;
pub mod storage;

pub use adapter::PluginAdapter;
pub use audit::ActionLog;
pub use blob::BlobSink;
pub use channel::ChannelAdapter;
pub use storage::{CodeLedger, StorageAdapter, UserDirectory};
