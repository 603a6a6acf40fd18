// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The serve loop: wires the adapters together and pumps events
//! through the dialogue engine until shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use kupona_audit::FileActionLog;
use kupona_config::model::KuponaConfig;
use kupona_core::{
    ChannelAdapter, CodeLedger, KuponaError, OutboundResponse, PluginAdapter, StorageAdapter,
    UserDirectory,
};
use kupona_dialogue::{DialogueEngine, DialoguePolicy};
use kupona_storage::adapter::SqliteStorage;
use kupona_storage::blobs::FsBlobSink;
use kupona_telegram::TelegramChannel;

/// Interval between idle-session eviction sweeps.
const EVICTION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Runs the bot: storage, audit log, dialogue engine, and the Telegram
/// channel, with graceful shutdown on ctrl-c.
pub async fn run_serve(config: KuponaConfig) -> Result<(), KuponaError> {
    init_tracing(&config.agent.log_level);

    info!(name = %config.agent.name, "starting kupona serve");

    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let blobs = Arc::new(FsBlobSink::new(config.storage.media_dir.clone())?);
    let audit = Arc::new(FileActionLog::new(&config.audit.log_dir).await?);

    let policy = DialoguePolicy {
        min_images: config.dialogue.min_images,
        consume_on_redeem: config.dialogue.consume_on_redeem,
    };

    let engine = DialogueEngine::new(
        storage.clone() as Arc<dyn CodeLedger>,
        storage.clone() as Arc<dyn UserDirectory>,
        blobs,
        audit,
        policy,
        config.telegram.admin_users.clone(),
    );

    let mut channel = TelegramChannel::new(&config.telegram)?;
    channel.connect().await?;

    let max_idle = Duration::from_secs(config.dialogue.session_idle_secs);
    let mut eviction = tokio::time::interval(EVICTION_SWEEP_INTERVAL);
    eviction.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    info!("kupona is serving");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            _ = eviction.tick() => {
                let evicted = engine.evict_idle(max_idle);
                if evicted > 0 {
                    debug!(evicted, "evicted idle sessions");
                }
            }
            event = channel.receive() => {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => {
                        error!(error = %e, "channel receive failed");
                        break;
                    }
                };
                handle_turn(&engine, &channel, event).await;
            }
        }
    }

    channel.shutdown().await?;
    storage.shutdown().await?;
    info!("kupona stopped");
    Ok(())
}

/// Runs one dialogue turn. Turn-level faults are logged and answered with
/// an apology; they never take the serve loop down.
async fn handle_turn(
    engine: &DialogueEngine,
    channel: &TelegramChannel,
    event: kupona_core::InboundEvent,
) {
    let user_id = event.user.user_id;
    let chat_id = event.chat_id;

    match engine.handle_event(event).await {
        Ok(responses) => {
            for response in responses {
                if let Err(e) = channel.send(response).await {
                    error!(user_id, error = %e, "failed to deliver response");
                }
            }
        }
        Err(e) => {
            error!(user_id, error = %e, "dialogue turn failed");
            let apology = OutboundResponse::text(
                chat_id,
                "Something went wrong on our side. Please try again.",
            );
            if let Err(e) = channel.send(apology).await {
                error!(user_id, error = %e, "failed to deliver apology");
            }
        }
    }
}

/// Creates the database file and runs migrations, then exits.
pub async fn run_init_db(config: KuponaConfig) -> Result<(), KuponaError> {
    init_tracing(&config.agent.log_level);

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    storage.close().await?;

    info!(path = %config.storage.database_path, "database initialized");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kupona={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
