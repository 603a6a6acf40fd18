// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem blob sink for code images.
//!
//! Assets land in a flat directory under the `<code><sequence>.jpg` naming
//! convention (sequence starts at 1). Nothing else references the files;
//! the ledger only knows the code.

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use kupona_core::{BlobSink, KuponaError};

/// Blob sink writing image assets to a local directory.
pub struct FsBlobSink {
    root: PathBuf,
}

impl FsBlobSink {
    /// Create the sink, creating the target directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, KuponaError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| KuponaError::Blob {
            source: Box::new(e),
        })?;
        Ok(Self { root })
    }

    /// The on-disk path for a given `(code, sequence)` key.
    pub fn path_for(&self, code: &str, sequence: u32) -> PathBuf {
        self.root.join(format!("{code}{sequence}.jpg"))
    }
}

#[async_trait]
impl BlobSink for FsBlobSink {
    async fn store_blob(
        &self,
        code: &str,
        sequence: u32,
        bytes: &[u8],
    ) -> Result<(), KuponaError> {
        let path = self.path_for(code, sequence);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| KuponaError::Blob {
                source: Box::new(e),
            })?;
        debug!(path = %path.display(), size = bytes.len(), "stored code image");
        Ok(())
    }
}
