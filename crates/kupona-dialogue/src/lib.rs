// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dialogue state machines for Kupona.
//!
//! [`DialogueEngine`] routes channel-agnostic [`kupona_core::InboundEvent`]s
//! through the redemption and intake dialogues, holding per-user session
//! state in memory and talking to storage only through the adapter traits.

pub mod engine;
mod intake;
mod redemption;
pub mod session;

pub use engine::{main_menu, DialogueEngine, DialoguePolicy};
pub use session::{DialogueState, SessionStore};
