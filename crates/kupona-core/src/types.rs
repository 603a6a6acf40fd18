// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Kupona dialogues.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Identity and profile fields of the user behind an inbound event.
///
/// Delivered by the channel on every event. `phone` is only present once
/// the user has shared a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub user_id: i64,
    pub display_name: String,
    pub handle: Option<String>,
    pub phone: Option<String>,
}

/// The shape of an inbound event, after channel-specific decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// The user opened or reset the conversation (`/start`).
    StartCommand,
    /// The user pressed an inline keyboard button; carries the callback data.
    CallbackSelection(String),
    /// A plain text message.
    TextMessage(String),
    /// An image attachment, already downloaded by the channel.
    ImageMessage {
        data: Vec<u8>,
        caption: Option<String>,
    },
    /// The user shared a contact; carries the phone number.
    ContactShared(String),
}

/// An inbound event received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub user: UserIdentity,
    pub chat_id: i64,
    pub kind: EventKind,
}

/// An outbound response to be delivered via a channel adapter.
///
/// Fire-and-forget from the dialogues' perspective; no acknowledgement
/// flows back into the state machines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResponse {
    pub chat_id: i64,
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl OutboundResponse {
    /// A plain text reply with no keyboard.
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    /// A reply carrying an inline keyboard.
    pub fn with_keyboard(chat_id: i64, text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            chat_id,
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// A channel-agnostic inline keyboard: rows of labeled callback buttons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<KeyboardButton>>,
}

/// A single inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardButton {
    pub label: String,
    pub callback_data: String,
}

impl KeyboardButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// A single code record in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeRecord {
    pub code: String,
    pub description: String,
    pub quantity: i64,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Storage,
    BlobStore,
    AuditLog,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn adapter_type_display_round_trips() {
        for variant in [
            AdapterType::Channel,
            AdapterType::Storage,
            AdapterType::BlobStore,
            AdapterType::AuditLog,
        ] {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn outbound_response_constructors() {
        let plain = OutboundResponse::text(42, "hello");
        assert_eq!(plain.chat_id, 42);
        assert!(plain.keyboard.is_none());

        let kb = Keyboard {
            rows: vec![vec![KeyboardButton::new("Redeem", "redeem")]],
        };
        let with_kb = OutboundResponse::with_keyboard(42, "pick one", kb);
        assert_eq!(
            with_kb.keyboard.unwrap().rows[0][0].callback_data,
            "redeem"
        );
    }

    #[test]
    fn user_identity_serializes() {
        let user = UserIdentity {
            user_id: 7,
            display_name: "Test".into(),
            handle: Some("tester".into()),
            phone: None,
        };
        let json = serde_json::to_string(&user).unwrap();
        let back: UserIdentity = serde_json::from_str(&json).unwrap();
        assert_eq!(user, back);
    }
}
