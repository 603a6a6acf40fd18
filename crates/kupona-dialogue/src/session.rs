// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user dialogue session state.
//!
//! A session exists only between dialogue entry and completion or
//! cancellation; the absence of an entry is the Idle state. Entries are
//! keyed by user ID with per-key atomicity only -- events for the same
//! user arrive in order (transport-guaranteed), so no cross-user locking
//! is needed.

use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Explicit state tags for the two dialogues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogueState {
    /// Redemption: waiting for the user's code.
    RedeemAwaitingCode,
    /// Intake: waiting for a fresh code from the operator.
    IntakeAwaitingCode,
    /// Intake: collecting images for the code.
    IntakeAwaitingImages,
    /// Intake: waiting for the description text.
    IntakeAwaitingDescription,
    /// Intake: waiting for the quantity.
    IntakeAwaitingQuantity,
}

impl std::fmt::Display for DialogueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DialogueState::RedeemAwaitingCode => write!(f, "redeem-awaiting-code"),
            DialogueState::IntakeAwaitingCode => write!(f, "intake-awaiting-code"),
            DialogueState::IntakeAwaitingImages => write!(f, "intake-awaiting-images"),
            DialogueState::IntakeAwaitingDescription => write!(f, "intake-awaiting-description"),
            DialogueState::IntakeAwaitingQuantity => write!(f, "intake-awaiting-quantity"),
        }
    }
}

/// Partially-collected intake fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scratch {
    pub code: Option<String>,
    pub image_count: u32,
    pub description: Option<String>,
}

/// One user's in-flight dialogue.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub state: DialogueState,
    pub scratch: Scratch,
    last_activity: Instant,
}

/// In-memory session store keyed by user ID.
///
/// Abandoned sessions are bounded by [`evict_idle`](SessionStore::evict_idle),
/// which the serve loop runs periodically.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<i64, SessionEntry>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a dialogue with fresh scratch state, replacing any in-flight session.
    pub fn begin(&self, user_id: i64, state: DialogueState) {
        self.sessions.insert(
            user_id,
            SessionEntry {
                state,
                scratch: Scratch::default(),
                last_activity: Instant::now(),
            },
        );
    }

    /// Current state and a copy of the scratch fields, or `None` when Idle.
    pub fn snapshot(&self, user_id: i64) -> Option<(DialogueState, Scratch)> {
        self.sessions
            .get(&user_id)
            .map(|entry| (entry.state, entry.scratch.clone()))
    }

    /// Advance the state tag, keeping the scratch fields.
    pub fn set_state(&self, user_id: i64, state: DialogueState) {
        if let Some(mut entry) = self.sessions.get_mut(&user_id) {
            entry.state = state;
            entry.last_activity = Instant::now();
        }
    }

    /// Mutate the session entry in place.
    pub fn update(&self, user_id: i64, f: impl FnOnce(&mut SessionEntry)) {
        if let Some(mut entry) = self.sessions.get_mut(&user_id) {
            f(&mut entry);
            entry.last_activity = Instant::now();
        }
    }

    /// Refresh the activity timestamp without changing state.
    pub fn touch(&self, user_id: i64) {
        if let Some(mut entry) = self.sessions.get_mut(&user_id) {
            entry.last_activity = Instant::now();
        }
    }

    /// Return the user to Idle, dropping any scratch state.
    pub fn clear(&self, user_id: i64) {
        self.sessions.remove(&user_id);
    }

    /// Remove sessions idle for longer than `max_idle`. Returns the count removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let before = self.sessions.len();
        let now = Instant::now();
        self.sessions
            .retain(|_, entry| now.duration_since(entry.last_activity) <= max_idle);
        before - self.sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Test hook: age an entry as if it had been idle for `age`.
    #[cfg(test)]
    pub(crate) fn backdate(&self, user_id: i64, age: Duration) {
        if let Some(mut entry) = self.sessions.get_mut(&user_id) {
            entry.last_activity = Instant::now() - age;
        }
    }
}
