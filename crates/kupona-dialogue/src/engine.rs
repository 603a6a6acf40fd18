// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event routing for the redemption and intake dialogues.
//!
//! The engine owns the per-user session store and holds injected trait
//! objects for the ledger, directory, blob sink, and action log, so the
//! dialogues are testable without any transport. Events for different
//! users may be handled concurrently (`&self` throughout); per-user
//! ordering is guaranteed by the transport.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use kupona_core::types::{EventKind, Keyboard, KeyboardButton, UserIdentity};
use kupona_core::{
    ActionLog, BlobSink, CodeLedger, InboundEvent, KuponaError, OutboundResponse, UserDirectory,
};

use crate::session::{DialogueState, SessionStore};

/// Callback data for the redeem menu button.
pub const CALLBACK_REDEEM: &str = "redeem";
/// Callback data for the register menu button.
pub const CALLBACK_REGISTER: &str = "register";

/// Dialogue policy knobs, lifted from configuration.
#[derive(Debug, Clone)]
pub struct DialoguePolicy {
    /// Minimum number of images the intake dialogue collects per code.
    pub min_images: u32,
    /// Whether a successful redemption lookup also consumes one unit.
    pub consume_on_redeem: bool,
}

impl Default for DialoguePolicy {
    fn default() -> Self {
        Self {
            min_images: 3,
            consume_on_redeem: false,
        }
    }
}

/// Returns whether the input has the shape of a code: exactly four decimal digits.
pub fn is_valid_code_shape(input: &str) -> bool {
    input.len() == 4 && input.bytes().all(|b| b.is_ascii_digit())
}

/// The main menu keyboard shown on `/start` and in hints.
pub fn main_menu() -> Keyboard {
    Keyboard {
        rows: vec![
            vec![KeyboardButton::new("🎁 Redeem a code", CALLBACK_REDEEM)],
            vec![KeyboardButton::new("➕ Register a code", CALLBACK_REGISTER)],
        ],
    }
}

/// Coordinates the two dialogue state machines over injected collaborators.
pub struct DialogueEngine {
    pub(crate) ledger: Arc<dyn CodeLedger>,
    pub(crate) directory: Arc<dyn UserDirectory>,
    pub(crate) blobs: Arc<dyn BlobSink>,
    pub(crate) audit: Arc<dyn ActionLog>,
    pub(crate) sessions: SessionStore,
    pub(crate) policy: DialoguePolicy,
    admin_users: Vec<String>,
}

impl DialogueEngine {
    pub fn new(
        ledger: Arc<dyn CodeLedger>,
        directory: Arc<dyn UserDirectory>,
        blobs: Arc<dyn BlobSink>,
        audit: Arc<dyn ActionLog>,
        policy: DialoguePolicy,
        admin_users: Vec<String>,
    ) -> Self {
        Self {
            ledger,
            directory,
            blobs,
            audit,
            sessions: SessionStore::new(),
            policy,
            admin_users,
        }
    }

    /// Handle one inbound event and produce the responses to deliver.
    ///
    /// Storage and blob faults propagate; the session's scratch state is
    /// left as-is so a retry of the same input is possible on the next turn.
    pub async fn handle_event(
        &self,
        event: InboundEvent,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        // Write-through log of who interacted, on every event.
        self.directory.upsert_user(&event.user).await?;

        match &event.kind {
            EventKind::StartCommand => self.handle_start(&event).await,
            EventKind::CallbackSelection(data) => self.handle_callback(&event, data).await,
            EventKind::ContactShared(_) => self.handle_contact(&event).await,
            EventKind::TextMessage(_) | EventKind::ImageMessage { .. } => {
                self.dispatch(&event).await
            }
        }
    }

    /// Evict sessions idle for longer than `max_idle`. Returns the count removed.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        self.sessions.evict_idle(max_idle)
    }

    /// Current session state of a user, `None` when Idle. Exposed for tests
    /// and the status tooling.
    pub fn session_state(&self, user_id: i64) -> Option<DialogueState> {
        self.sessions.snapshot(user_id).map(|(state, _)| state)
    }

    async fn handle_start(
        &self,
        event: &InboundEvent,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        // A fresh entry: any in-flight dialogue is abandoned.
        self.sessions.clear(event.user.user_id);
        self.audit.record(&event.user, "started the bot").await;

        let greeting = format!(
            "Hello, {}! What would you like to do?",
            event.user.display_name
        );
        Ok(vec![OutboundResponse::with_keyboard(
            event.chat_id,
            greeting,
            main_menu(),
        )])
    }

    async fn handle_callback(
        &self,
        event: &InboundEvent,
        data: &str,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        match data {
            CALLBACK_REDEEM => {
                self.sessions
                    .begin(event.user.user_id, DialogueState::RedeemAwaitingCode);
                self.audit
                    .record(&event.user, "opened the redemption dialogue")
                    .await;
                Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    "Please enter your 4-digit code:",
                )])
            }
            CALLBACK_REGISTER => {
                if !is_operator(&event.user, &self.admin_users) {
                    self.audit
                        .record(&event.user, "was refused the intake dialogue (not an operator)")
                        .await;
                    return Ok(vec![OutboundResponse::text(
                        event.chat_id,
                        "Sorry, registering codes is for operators only.",
                    )]);
                }
                self.sessions
                    .begin(event.user.user_id, DialogueState::IntakeAwaitingCode);
                self.audit
                    .record(&event.user, "opened the intake dialogue")
                    .await;
                Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    "Enter the new 4-digit code to register:",
                )])
            }
            other => {
                debug!(callback = other, "ignoring unknown callback selection");
                Ok(vec![OutboundResponse::with_keyboard(
                    event.chat_id,
                    "Please pick an option from the menu.",
                    main_menu(),
                )])
            }
        }
    }

    async fn handle_contact(
        &self,
        event: &InboundEvent,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        // The phone number already landed in the directory via the upsert.
        self.audit.record(&event.user, "shared a contact").await;
        Ok(vec![OutboundResponse::text(
            event.chat_id,
            "Thanks, your phone number has been saved.",
        )])
    }

    /// Route a text or image message to whichever dialogue state the user is in.
    async fn dispatch(&self, event: &InboundEvent) -> Result<Vec<OutboundResponse>, KuponaError> {
        let Some((state, scratch)) = self.sessions.snapshot(event.user.user_id) else {
            return Ok(vec![OutboundResponse::with_keyboard(
                event.chat_id,
                "Please pick an option from the menu first.",
                main_menu(),
            )]);
        };

        debug!(user_id = event.user.user_id, state = %state, "dispatching dialogue event");
        match state {
            DialogueState::RedeemAwaitingCode => self.redeem_awaiting_code(event).await,
            DialogueState::IntakeAwaitingCode => self.intake_awaiting_code(event).await,
            DialogueState::IntakeAwaitingImages => {
                self.intake_awaiting_images(event, scratch).await
            }
            DialogueState::IntakeAwaitingDescription => {
                self.intake_awaiting_description(event).await
            }
            DialogueState::IntakeAwaitingQuantity => {
                self.intake_awaiting_quantity(event, scratch).await
            }
        }
    }
}

/// Operator check against the configured admin list, by numeric user ID or
/// @username (case-insensitive, `@` optional). An empty list means nobody
/// can register codes (secure default).
fn is_operator(user: &UserIdentity, admin_users: &[String]) -> bool {
    if admin_users.is_empty() {
        return false;
    }

    let user_id_str = user.user_id.to_string();
    for allowed in admin_users {
        if *allowed == user_id_str {
            return true;
        }
        if let Some(handle) = &user.handle {
            let allowed_clean = allowed.strip_prefix('@').unwrap_or(allowed);
            if handle.eq_ignore_ascii_case(allowed_clean) {
                return true;
            }
        }
    }

    false
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use kupona_core::types::CodeRecord;

    // --- In-memory fakes for the adapter seams ---

    #[derive(Default)]
    pub struct MemoryLedger {
        pub records: Mutex<HashMap<String, (String, i64)>>,
        pub lookups: AtomicUsize,
    }

    impl MemoryLedger {
        pub fn with_code(code: &str, description: &str, quantity: i64) -> Self {
            let ledger = Self::default();
            ledger
                .records
                .lock()
                .unwrap()
                .insert(code.into(), (description.into(), quantity));
            ledger
        }

        pub fn quantity(&self, code: &str) -> Option<i64> {
            self.records.lock().unwrap().get(code).map(|(_, q)| *q)
        }
    }

    #[async_trait]
    impl CodeLedger for MemoryLedger {
        async fn lookup(&self, code: &str) -> Result<Option<CodeRecord>, KuponaError> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.lock().unwrap().get(code).map(|(d, q)| {
                CodeRecord {
                    code: code.to_string(),
                    description: d.clone(),
                    quantity: *q,
                }
            }))
        }

        async fn create(
            &self,
            code: &str,
            description: &str,
            quantity: i64,
        ) -> Result<(), KuponaError> {
            let mut records = self.records.lock().unwrap();
            if records.contains_key(code) {
                return Err(KuponaError::DuplicateCode {
                    code: code.to_string(),
                });
            }
            records.insert(code.to_string(), (description.to_string(), quantity));
            Ok(())
        }

        async fn decrement_if_available(&self, code: &str) -> Result<bool, KuponaError> {
            let mut records = self.records.lock().unwrap();
            match records.get_mut(code) {
                Some((_, quantity)) if *quantity > 0 => {
                    *quantity -= 1;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }

        async fn set_quantity(&self, code: &str, quantity: i64) -> Result<(), KuponaError> {
            if let Some((_, q)) = self.records.lock().unwrap().get_mut(code) {
                *q = quantity;
            }
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryDirectory {
        pub upserts: AtomicUsize,
    }

    #[async_trait]
    impl UserDirectory for MemoryDirectory {
        async fn upsert_user(&self, _user: &UserIdentity) -> Result<(), KuponaError> {
            self.upserts.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryBlobs {
        pub stored: Mutex<Vec<(String, u32, usize)>>,
    }

    #[async_trait]
    impl BlobSink for MemoryBlobs {
        async fn store_blob(
            &self,
            code: &str,
            sequence: u32,
            bytes: &[u8],
        ) -> Result<(), KuponaError> {
            self.stored
                .lock()
                .unwrap()
                .push((code.to_string(), sequence, bytes.len()));
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct RecordingAudit {
        pub entries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ActionLog for RecordingAudit {
        async fn record(&self, user: &UserIdentity, message: &str) {
            self.entries
                .lock()
                .unwrap()
                .push(format!("{}: {}", user.user_id, message));
        }
    }

    // --- Test fixture ---

    pub struct Fixture {
        pub ledger: Arc<MemoryLedger>,
        pub directory: Arc<MemoryDirectory>,
        pub blobs: Arc<MemoryBlobs>,
        pub audit: Arc<RecordingAudit>,
        pub engine: DialogueEngine,
    }

    pub fn fixture_with(ledger: MemoryLedger, policy: DialoguePolicy) -> Fixture {
        let ledger = Arc::new(ledger);
        let directory = Arc::new(MemoryDirectory::default());
        let blobs = Arc::new(MemoryBlobs::default());
        let audit = Arc::new(RecordingAudit::default());
        let engine = DialogueEngine::new(
            ledger.clone(),
            directory.clone(),
            blobs.clone(),
            audit.clone(),
            policy,
            vec!["777".to_string(), "@operator".to_string()],
        );
        Fixture {
            ledger,
            directory,
            blobs,
            audit,
            engine,
        }
    }

    pub fn fixture() -> Fixture {
        fixture_with(MemoryLedger::default(), DialoguePolicy::default())
    }

    pub fn end_user() -> UserIdentity {
        UserIdentity {
            user_id: 100,
            display_name: "Alice".into(),
            handle: Some("alice".into()),
            phone: None,
        }
    }

    pub fn operator() -> UserIdentity {
        UserIdentity {
            user_id: 777,
            display_name: "Op".into(),
            handle: Some("operator".into()),
            phone: Some("+998900000000".into()),
        }
    }

    pub fn event(user: &UserIdentity, kind: EventKind) -> InboundEvent {
        InboundEvent {
            user: user.clone(),
            chat_id: user.user_id,
            kind,
        }
    }

    pub fn text(user: &UserIdentity, t: &str) -> InboundEvent {
        event(user, EventKind::TextMessage(t.to_string()))
    }

    pub fn image(user: &UserIdentity) -> InboundEvent {
        event(
            user,
            EventKind::ImageMessage {
                data: vec![0xFF, 0xD8, 0xFF],
                caption: None,
            },
        )
    }

    // --- Routing tests ---

    #[test]
    fn code_shape_validation() {
        assert!(is_valid_code_shape("1234"));
        assert!(is_valid_code_shape("0000"));
        assert!(!is_valid_code_shape("12a3"));
        assert!(!is_valid_code_shape("123"));
        assert!(!is_valid_code_shape("12345"));
        assert!(!is_valid_code_shape("12 4"));
        assert!(!is_valid_code_shape(""));
        assert!(!is_valid_code_shape("١٢٣٤"), "non-ASCII digits rejected");
    }

    #[test]
    fn operator_matching_rules() {
        let admins = vec!["777".to_string(), "@OperatorTwo".to_string()];
        assert!(is_operator(&operator(), &admins));

        let by_handle = UserIdentity {
            user_id: 1,
            display_name: "x".into(),
            handle: Some("operatortwo".into()),
            phone: None,
        };
        assert!(is_operator(&by_handle, &admins), "case-insensitive handle");

        assert!(!is_operator(&end_user(), &admins));
        assert!(!is_operator(&operator(), &[]), "empty list refuses everyone");
    }

    #[tokio::test]
    async fn start_greets_with_menu_and_upserts_user() {
        let fx = fixture();
        let responses = fx
            .engine
            .handle_event(event(&end_user(), EventKind::StartCommand))
            .await
            .unwrap();

        assert_eq!(responses.len(), 1);
        assert!(responses[0].text.contains("Alice"));
        assert!(responses[0].keyboard.is_some());
        assert_eq!(fx.directory.upserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn start_clears_an_in_flight_session() {
        let fx = fixture();
        fx.engine
            .handle_event(event(
                &end_user(),
                EventKind::CallbackSelection(CALLBACK_REDEEM.into()),
            ))
            .await
            .unwrap();
        assert_eq!(
            fx.engine.session_state(100),
            Some(DialogueState::RedeemAwaitingCode)
        );

        fx.engine
            .handle_event(event(&end_user(), EventKind::StartCommand))
            .await
            .unwrap();
        assert_eq!(fx.engine.session_state(100), None);
    }

    #[tokio::test]
    async fn register_callback_is_refused_for_non_operators() {
        let fx = fixture();
        let responses = fx
            .engine
            .handle_event(event(
                &end_user(),
                EventKind::CallbackSelection(CALLBACK_REGISTER.into()),
            ))
            .await
            .unwrap();

        assert!(responses[0].text.contains("operators only"));
        assert_eq!(fx.engine.session_state(100), None);
    }

    #[tokio::test]
    async fn text_without_a_session_gets_a_menu_hint() {
        let fx = fixture();
        let responses = fx
            .engine
            .handle_event(text(&end_user(), "hello?"))
            .await
            .unwrap();
        assert!(responses[0].keyboard.is_some());
    }

    #[tokio::test]
    async fn contact_share_acknowledges_and_upserts() {
        let fx = fixture();
        let mut user = end_user();
        user.phone = Some("+998901234567".into());
        let responses = fx
            .engine
            .handle_event(event(
                &user,
                EventKind::ContactShared("+998901234567".into()),
            ))
            .await
            .unwrap();

        assert!(responses[0].text.contains("saved"));
        assert_eq!(fx.directory.upserts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_handled_event_leaves_an_audit_entry() {
        let fx = fixture();
        fx.engine
            .handle_event(event(&end_user(), EventKind::StartCommand))
            .await
            .unwrap();
        fx.engine
            .handle_event(event(
                &end_user(),
                EventKind::CallbackSelection(CALLBACK_REDEEM.into()),
            ))
            .await
            .unwrap();

        let entries = fx.audit.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].starts_with("100:"));
    }

    #[tokio::test]
    async fn idle_sessions_are_evicted() {
        let fx = fixture();
        fx.engine
            .handle_event(event(
                &end_user(),
                EventKind::CallbackSelection(CALLBACK_REDEEM.into()),
            ))
            .await
            .unwrap();

        fx.engine.sessions.backdate(100, Duration::from_secs(7200));
        assert_eq!(fx.engine.evict_idle(Duration::from_secs(1800)), 1);
        assert_eq!(fx.engine.session_state(100), None);
    }
}
