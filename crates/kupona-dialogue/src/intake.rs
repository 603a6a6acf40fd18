// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The operator intake dialogue: code, images, description, quantity.
//!
//! The ledger insert happens last, at the quantity step, so an abandoned
//! session leaves no partial code behind. Image blobs are written as they
//! arrive; a blob fault propagates before the counter advances, so the
//! operator can simply resend the same photo.

use kupona_core::types::EventKind;
use kupona_core::{InboundEvent, KuponaError, OutboundResponse};

use crate::engine::{is_valid_code_shape, main_menu, DialogueEngine};
use crate::session::{DialogueState, Scratch};

impl DialogueEngine {
    /// `IntakeAwaitingCode`: the operator names the code to register.
    pub(crate) async fn intake_awaiting_code(
        &self,
        event: &InboundEvent,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        let input = match &event.kind {
            EventKind::TextMessage(text) => text.trim(),
            _ => {
                self.sessions.touch(event.user.user_id);
                return Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    "Please send the code as text.",
                )]);
            }
        };

        if !is_valid_code_shape(input) {
            self.sessions.touch(event.user.user_id);
            return Ok(vec![OutboundResponse::text(
                event.chat_id,
                "A code is exactly 4 digits. Please try again:",
            )]);
        }

        // Early duplicate check. Advisory only: the insert at the quantity
        // step is the authoritative one.
        if self.ledger.lookup(input).await?.is_some() {
            self.sessions.touch(event.user.user_id);
            return Ok(vec![OutboundResponse::text(
                event.chat_id,
                format!("Code {input} is already registered. Enter a different code:"),
            )]);
        }

        let code = input.to_string();
        self.sessions.update(event.user.user_id, |entry| {
            entry.scratch = Scratch {
                code: Some(code),
                ..Scratch::default()
            };
            entry.state = DialogueState::IntakeAwaitingImages;
        });
        self.audit
            .record(
                &event.user,
                &format!("accepted code {input} for intake, collecting photos"),
            )
            .await;

        Ok(vec![OutboundResponse::text(
            event.chat_id,
            format!(
                "Code {input} accepted. Now send {} photos of the item.",
                self.policy.min_images
            ),
        )])
    }

    /// `IntakeAwaitingImages`: collect photos. The minimum is binding;
    /// extras are welcome. Any non-image after the minimum moves on.
    pub(crate) async fn intake_awaiting_images(
        &self,
        event: &InboundEvent,
        scratch: Scratch,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        let data = match &event.kind {
            EventKind::ImageMessage { data, .. } => data,
            _ => {
                if scratch.image_count >= self.policy.min_images {
                    // Proceed signal: enough photos, move on.
                    self.sessions.set_state(
                        event.user.user_id,
                        DialogueState::IntakeAwaitingDescription,
                    );
                    self.audit
                        .record(
                            &event.user,
                            &format!(
                                "finished photo collection ({} photos) for code {}",
                                scratch.image_count,
                                scratch.code.as_deref().unwrap_or("-")
                            ),
                        )
                        .await;
                    return Ok(vec![OutboundResponse::text(
                        event.chat_id,
                        "Now send a short description of the item:",
                    )]);
                }
                self.sessions.touch(event.user.user_id);
                let remaining = self.policy.min_images - scratch.image_count;
                return Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    format!("Please send a photo ({remaining} more needed)."),
                )]);
            }
        };

        let code = scratch
            .code
            .as_deref()
            .ok_or_else(|| KuponaError::Internal("image step reached without a code".into()))?;

        // Blob first, counter second: a write fault leaves the count
        // unchanged and the same photo can be resent.
        let sequence = scratch.image_count + 1;
        self.blobs.store_blob(code, sequence, data).await?;

        let collected = sequence;
        self.sessions.update(event.user.user_id, |entry| {
            entry.scratch.image_count = collected;
        });
        self.audit
            .record(
                &event.user,
                &format!("stored photo {collected} for code {code}"),
            )
            .await;

        if collected >= self.policy.min_images {
            return Ok(vec![OutboundResponse::text(
                event.chat_id,
                format!(
                    "Photo {collected} saved. Send more, or send any message to continue."
                ),
            )]);
        }
        let remaining = self.policy.min_images - collected;
        Ok(vec![OutboundResponse::text(
            event.chat_id,
            format!("Photo {collected} saved. Send {remaining} more."),
        )])
    }

    /// `IntakeAwaitingDescription`: one non-empty text message.
    pub(crate) async fn intake_awaiting_description(
        &self,
        event: &InboundEvent,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        let input = match &event.kind {
            EventKind::TextMessage(text) => text,
            _ => {
                self.sessions.touch(event.user.user_id);
                return Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    "Please send the description as text.",
                )]);
            }
        };

        if input.trim().is_empty() {
            self.sessions.touch(event.user.user_id);
            return Ok(vec![OutboundResponse::text(
                event.chat_id,
                "The description cannot be empty. Please try again:",
            )]);
        }

        // Stored verbatim; only the emptiness check looks at a trimmed view.
        let description = input.clone();
        self.sessions.update(event.user.user_id, |entry| {
            entry.scratch.description = Some(description);
            entry.state = DialogueState::IntakeAwaitingQuantity;
        });
        self.audit
            .record(&event.user, "captured the item description")
            .await;

        Ok(vec![OutboundResponse::text(
            event.chat_id,
            "Got it. How many units can this code be redeemed for?",
        )])
    }

    /// `IntakeAwaitingQuantity`: a positive integer commits the code.
    pub(crate) async fn intake_awaiting_quantity(
        &self,
        event: &InboundEvent,
        scratch: Scratch,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        let input = match &event.kind {
            EventKind::TextMessage(text) => text.trim(),
            _ => {
                self.sessions.touch(event.user.user_id);
                return Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    "Please send the quantity as a number.",
                )]);
            }
        };

        let quantity = match input.parse::<i64>() {
            Ok(n) if n > 0 => n,
            _ => {
                self.sessions.touch(event.user.user_id);
                return Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    "The quantity must be a whole number greater than zero. Try again:",
                )]);
            }
        };

        let code = scratch
            .code
            .clone()
            .ok_or_else(|| KuponaError::Internal("quantity step reached without a code".into()))?;
        let description = scratch.description.clone().ok_or_else(|| {
            KuponaError::Internal("quantity step reached without a description".into())
        })?;

        match self.ledger.create(&code, &description, quantity).await {
            Ok(()) => {}
            Err(KuponaError::DuplicateCode { .. }) => {
                // Someone registered the same code while this dialogue was
                // in flight. Restart from the code step; the images already
                // on disk for the old code are harmless orphans.
                self.sessions
                    .begin(event.user.user_id, DialogueState::IntakeAwaitingCode);
                self.audit
                    .record(
                        &event.user,
                        &format!("intake collided on code {code}, restarting"),
                    )
                    .await;
                return Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    format!(
                        "Code {code} was registered by someone else in the meantime. \
                         Enter a different code:"
                    ),
                )]);
            }
            Err(e) => return Err(e),
        }

        self.sessions.clear(event.user.user_id);
        self.audit
            .record(
                &event.user,
                &format!("registered code {code} with quantity {quantity}"),
            )
            .await;

        Ok(vec![OutboundResponse::with_keyboard(
            event.chat_id,
            format!(
                "Done! Code {code} ({description}, {} photos) is registered for {quantity} redemptions.",
                scratch.image_count
            ),
            main_menu(),
        )])
    }
}
