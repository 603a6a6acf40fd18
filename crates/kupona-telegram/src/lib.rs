// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for the Kupona bot.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide,
//! providing long polling, DM filtering, photo download, and inline
//! keyboard delivery.

pub mod handler;
pub mod media;

use async_trait::async_trait;
use kupona_config::model::TelegramConfig;
use kupona_core::types::{AdapterType, HealthStatus, Keyboard};
use kupona_core::{ChannelAdapter, InboundEvent, KuponaError, OutboundResponse, PluginAdapter};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardButton, InlineKeyboardMarkup, Recipient};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Telegram channel adapter implementing [`ChannelAdapter`].
///
/// Connects to Telegram via long polling, filters updates down to DM
/// messages and callback queries, and hands decoded events to the serve
/// loop over an internal queue.
#[derive(Debug)]
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundEvent>>,
    inbound_tx: mpsc::Sender<InboundEvent>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, KuponaError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            KuponaError::Config("telegram.bot_token is required for the Telegram channel".into())
        })?;

        if token.is_empty() {
            return Err(KuponaError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let bot = Bot::new(token);
        let (inbound_tx, inbound_rx) = mpsc::channel(100);

        Ok(Self {
            bot,
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// Maps the channel-agnostic keyboard onto a Telegram inline keyboard.
fn to_inline_keyboard(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.callback_data.clone()))
            .collect::<Vec<_>>()
    }))
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, KuponaError> {
        // Check if the bot token is valid by calling getMe.
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), KuponaError> {
        debug!("Telegram channel shutting down");
        if let Some(handle) = &self.polling_handle {
            handle.abort();
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), KuponaError> {
        if self.polling_handle.is_some() {
            return Ok(()); // Already connected
        }

        let bot = self.bot.clone();
        let msg_tx = self.inbound_tx.clone();
        let cb_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handle = tokio::spawn(async move {
            let message_branch = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
                let tx = msg_tx.clone();
                async move {
                    // Filter: DMs only
                    if !handler::is_dm(&msg) {
                        debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                        return respond(());
                    }

                    match handler::event_from_message(&bot, &msg).await {
                        Ok(Some(event)) => {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping event");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            error!(error = %e, "failed to decode message");
                        }
                    }

                    respond(())
                }
            });

            let callback_branch =
                Update::filter_callback_query().endpoint(move |bot: Bot, q: CallbackQuery| {
                    let tx = cb_tx.clone();
                    async move {
                        // Stop the client-side spinner regardless of routing.
                        if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
                            warn!(error = %e, "failed to answer callback query");
                        }

                        if let Some(event) = handler::event_from_callback(&q) {
                            if tx.send(event).await.is_err() {
                                warn!("inbound channel closed, dropping callback");
                            }
                        }

                        respond(())
                    }
                });

            Dispatcher::builder(
                bot,
                dptree::entry()
                    .branch(message_branch)
                    .branch(callback_branch),
            )
            .default_handler(|_| async {}) // Silently ignore other update kinds
            .build()
            .dispatch()
            .await;
        });

        self.polling_handle = Some(handle);
        Ok(())
    }

    async fn send(&self, response: OutboundResponse) -> Result<(), KuponaError> {
        let chat_id = Recipient::Id(ChatId(response.chat_id));
        let request = self.bot.send_message(chat_id, &response.text);

        let result = match &response.keyboard {
            Some(keyboard) => request.reply_markup(to_inline_keyboard(keyboard)).await,
            None => request.await,
        };

        result.map_err(|e| KuponaError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(())
    }

    async fn receive(&self) -> Result<InboundEvent, KuponaError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| KuponaError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kupona_core::types::KeyboardButton;

    #[test]
    fn keyboard_maps_rows_and_callback_data() {
        let keyboard = Keyboard {
            rows: vec![
                vec![KeyboardButton::new("Redeem", "redeem")],
                vec![KeyboardButton::new("Register", "register")],
            ],
        };
        let markup = to_inline_keyboard(&keyboard);

        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0][0].text, "Redeem");
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let config = TelegramConfig {
            bot_token: None,
            admin_users: vec![],
        };
        let err = TelegramChannel::new(&config).unwrap_err();
        assert!(matches!(err, KuponaError::Config(_)));
    }

    #[test]
    fn empty_token_is_a_config_error() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
            admin_users: vec![],
        };
        assert!(TelegramChannel::new(&config).is_err());
    }
}
