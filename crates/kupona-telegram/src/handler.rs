// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Update decoding: Telegram messages and callback queries into
//! channel-agnostic [`InboundEvent`]s.

use kupona_core::types::{EventKind, InboundEvent, UserIdentity};
use kupona_core::KuponaError;
use teloxide::prelude::*;
use teloxide::types::{ChatKind, User};
use tracing::debug;

use crate::media;

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// Builds the channel-agnostic identity for a Telegram user.
///
/// The phone number is only known when the event itself carries a contact;
/// it is filled in by [`event_from_message`] in that case.
pub fn identity_from_user(user: &User) -> UserIdentity {
    let mut display_name = user.first_name.clone();
    if let Some(last) = &user.last_name {
        display_name.push(' ');
        display_name.push_str(last);
    }

    UserIdentity {
        user_id: user.id.0 as i64,
        display_name,
        handle: user.username.clone(),
        phone: None,
    }
}

/// Decodes a Telegram message into an [`InboundEvent`].
///
/// Handles `/start`, plain text, photos (downloaded eagerly), and shared
/// contacts. Returns `None` for messages without a sender or of an
/// unsupported type (stickers, locations, voice, etc.).
pub async fn event_from_message(
    bot: &Bot,
    msg: &Message,
) -> Result<Option<InboundEvent>, KuponaError> {
    let Some(from) = msg.from.as_ref() else {
        return Ok(None);
    };
    let mut user = identity_from_user(from);
    let chat_id = msg.chat.id.0;

    if let Some(text) = msg.text() {
        let kind = if text.trim() == "/start" || text.trim().starts_with("/start ") {
            EventKind::StartCommand
        } else {
            EventKind::TextMessage(text.to_string())
        };
        return Ok(Some(InboundEvent {
            user,
            chat_id,
            kind,
        }));
    }

    if let Some(photos) = msg.photo() {
        let data = media::download_largest_photo(bot, photos).await?;
        return Ok(Some(InboundEvent {
            user,
            chat_id,
            kind: EventKind::ImageMessage {
                data,
                caption: msg.caption().map(|s| s.to_string()),
            },
        }));
    }

    if let Some(contact) = msg.contact() {
        user.phone = Some(contact.phone_number.clone());
        return Ok(Some(InboundEvent {
            user,
            chat_id,
            kind: EventKind::ContactShared(contact.phone_number.clone()),
        }));
    }

    debug!(msg_id = msg.id.0, "ignoring unsupported message type");
    Ok(None)
}

/// Decodes a callback query (inline keyboard press) into an [`InboundEvent`].
///
/// Returns `None` when the query carries no data or the originating
/// message is no longer accessible.
pub fn event_from_callback(q: &CallbackQuery) -> Option<InboundEvent> {
    let data = q.data.as_ref()?;
    let chat_id = q.message.as_ref().map(|m| m.chat().id.0)?;

    Some(InboundEvent {
        user: identity_from_user(&q.from),
        chat_id,
        kind: EventKind::CallbackSelection(data.clone()),
    })
}
