// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the chat transport (Telegram).

use async_trait::async_trait;

use crate::error::KuponaError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundEvent, OutboundResponse};

/// Adapter for the bidirectional chat transport.
///
/// The channel decodes platform updates into [`InboundEvent`]s and delivers
/// [`OutboundResponse`]s. Delivery is fire-and-forget from the dialogues'
/// perspective; the transport guarantees per-user ordering of inbound events.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), KuponaError>;

    /// Sends a response through the channel.
    async fn send(&self, response: OutboundResponse) -> Result<(), KuponaError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundEvent, KuponaError>;
}
