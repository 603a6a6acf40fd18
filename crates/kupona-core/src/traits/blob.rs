// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob sink trait for image asset storage.

use async_trait::async_trait;

use crate::error::KuponaError;

/// Opaque blob sink for the images collected by the intake dialogue.
///
/// Assets are keyed by `(code, sequence)` with sequence starting at 1.
/// Failures propagate as [`KuponaError::Blob`] and fail the current
/// dialogue turn; the dialogue's scratch state is left untouched so the
/// same input can be retried.
#[async_trait]
pub trait BlobSink: Send + Sync {
    async fn store_blob(&self, code: &str, sequence: u32, bytes: &[u8])
        -> Result<(), KuponaError>;
}
