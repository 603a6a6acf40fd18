// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Photo download for Telegram messages.
//!
//! The dialogues receive image bytes, not file IDs, so the channel
//! downloads photos from Telegram servers before handing the event over.

use kupona_core::KuponaError;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::PhotoSize;
use tracing::debug;

/// Downloads the largest available variant of a photo.
///
/// Telegram lists multiple sizes per photo, largest last. Resolves the
/// server-side path with `getFile` and pulls the bytes into memory; code
/// images are small enough that buffering them whole is fine.
pub async fn download_largest_photo(
    bot: &Bot,
    photos: &[PhotoSize],
) -> Result<Vec<u8>, KuponaError> {
    let largest = photos.last().ok_or_else(|| KuponaError::Channel {
        message: "photo array is empty".into(),
        source: None,
    })?;

    let file = bot
        .get_file(largest.file.id.clone())
        .await
        .map_err(|e| KuponaError::Channel {
            message: format!("failed to resolve photo path: {e}"),
            source: Some(Box::new(e)),
        })?;

    let mut buf = Vec::with_capacity(file.size as usize);
    bot.download_file(&file.path, &mut buf)
        .await
        .map_err(|e| KuponaError::Channel {
            message: format!("failed to download photo: {e}"),
            source: Some(Box::new(e)),
        })?;

    debug!(file_id = %largest.file.id, size = buf.len(), "downloaded photo");
    Ok(buf)
}
