// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The redemption dialogue: one prompt, one code, one answer.

use kupona_core::types::EventKind;
use kupona_core::{InboundEvent, KuponaError, OutboundResponse};

use crate::engine::{is_valid_code_shape, main_menu, DialogueEngine};

impl DialogueEngine {
    /// `RedeemAwaitingCode`: the next text message is treated as a code.
    pub(crate) async fn redeem_awaiting_code(
        &self,
        event: &InboundEvent,
    ) -> Result<Vec<OutboundResponse>, KuponaError> {
        let input = match &event.kind {
            EventKind::TextMessage(text) => text.trim(),
            _ => {
                self.sessions.touch(event.user.user_id);
                return Ok(vec![OutboundResponse::text(
                    event.chat_id,
                    "Please enter your code as text.",
                )]);
            }
        };

        // Shape check first: malformed input never reaches the ledger.
        if !is_valid_code_shape(input) {
            self.sessions.touch(event.user.user_id);
            self.audit
                .record(&event.user, &format!("entered malformed code {input:?}"))
                .await;
            return Ok(vec![OutboundResponse::text(
                event.chat_id,
                "A code is exactly 4 digits. Please try again:",
            )]);
        }

        let record = self.ledger.lookup(input).await?;
        let Some(record) = record else {
            self.sessions.clear(event.user.user_id);
            self.audit
                .record(
                    &event.user,
                    &format!("tried to redeem unknown code {input}"),
                )
                .await;
            return Ok(vec![OutboundResponse::with_keyboard(
                event.chat_id,
                "Sorry, that code was not found.",
                main_menu(),
            )]);
        };

        if record.quantity <= 0 {
            self.sessions.clear(event.user.user_id);
            self.audit
                .record(
                    &event.user,
                    &format!("tried to redeem exhausted code {input}"),
                )
                .await;
            return Ok(vec![OutboundResponse::with_keyboard(
                event.chat_id,
                "Sorry, that code has already been fully redeemed.",
                main_menu(),
            )]);
        }

        let mut remaining = record.quantity;
        if self.policy.consume_on_redeem {
            // The lookup above is advisory only; the decrement is the
            // atomic check, and a concurrent redeemer may win the race.
            if self.ledger.decrement_if_available(input).await? {
                remaining -= 1;
            } else {
                self.sessions.clear(event.user.user_id);
                self.audit
                    .record(
                        &event.user,
                        &format!("lost the race redeeming code {input}"),
                    )
                    .await;
                return Ok(vec![OutboundResponse::with_keyboard(
                    event.chat_id,
                    "Sorry, that code has already been fully redeemed.",
                    main_menu(),
                )]);
            }
        }

        self.sessions.clear(event.user.user_id);
        self.audit
            .record(&event.user, &format!("redeemed code {input}"))
            .await;

        Ok(vec![OutboundResponse::with_keyboard(
            event.chat_id,
            format!(
                "Code {input} is valid!\n\n{}\n\nUnits remaining: {remaining}",
                record.description
            ),
            main_menu(),
        )])
    }
}
