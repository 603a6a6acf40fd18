// SPDX-FileCopyrightText: 2026 Kupona Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end dialogue flows over real SQLite storage, the filesystem
//! blob sink, and the file-backed action log. Only the chat transport
//! is absent; events are injected directly into the engine.

use std::sync::Arc;

use tempfile::TempDir;

use kupona_audit::FileActionLog;
use kupona_config::model::StorageConfig;
use kupona_core::types::{EventKind, InboundEvent, UserIdentity};
use kupona_core::{CodeLedger, StorageAdapter, UserDirectory};
use kupona_dialogue::{DialogueEngine, DialoguePolicy};
use kupona_storage::{FsBlobSink, SqliteStorage};

struct Harness {
    storage: Arc<SqliteStorage>,
    engine: DialogueEngine,
    dir: TempDir,
}

async fn harness() -> Harness {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig {
        database_path: dir
            .path()
            .join("kupona.db")
            .to_string_lossy()
            .into_owned(),
        media_dir: dir.path().join("media").to_string_lossy().into_owned(),
    };

    let storage = Arc::new(SqliteStorage::new(config.clone()));
    storage.initialize().await.unwrap();

    let blobs = Arc::new(FsBlobSink::new(config.media_dir.clone()).unwrap());
    let audit = Arc::new(
        FileActionLog::new(dir.path().join("logs"))
            .await
            .unwrap(),
    );

    let engine = DialogueEngine::new(
        storage.clone() as Arc<dyn CodeLedger>,
        storage.clone() as Arc<dyn UserDirectory>,
        blobs,
        audit,
        DialoguePolicy::default(),
        vec!["777".to_string()],
    );

    Harness {
        storage,
        engine,
        dir,
    }
}

fn operator() -> UserIdentity {
    UserIdentity {
        user_id: 777,
        display_name: "Op".into(),
        handle: Some("operator".into()),
        phone: None,
    }
}

fn end_user() -> UserIdentity {
    UserIdentity {
        user_id: 100,
        display_name: "Alice".into(),
        handle: None,
        phone: None,
    }
}

fn text(user: &UserIdentity, t: &str) -> InboundEvent {
    InboundEvent {
        user: user.clone(),
        chat_id: user.user_id,
        kind: EventKind::TextMessage(t.to_string()),
    }
}

fn image(user: &UserIdentity, bytes: &[u8]) -> InboundEvent {
    InboundEvent {
        user: user.clone(),
        chat_id: user.user_id,
        kind: EventKind::ImageMessage {
            data: bytes.to_vec(),
            caption: None,
        },
    }
}

fn callback(user: &UserIdentity, data: &str) -> InboundEvent {
    InboundEvent {
        user: user.clone(),
        chat_id: user.user_id,
        kind: EventKind::CallbackSelection(data.to_string()),
    }
}

#[tokio::test]
async fn intake_then_redemption_against_real_storage() {
    let hx = harness().await;
    let op = operator();

    // Operator registers code 4321 with three photos and quantity 2.
    hx.engine
        .handle_event(callback(&op, "register"))
        .await
        .unwrap();
    hx.engine.handle_event(text(&op, "4321")).await.unwrap();
    for i in 0..3u8 {
        hx.engine
            .handle_event(image(&op, &[0xFF, 0xD8, i]))
            .await
            .unwrap();
    }
    hx.engine.handle_event(text(&op, "done")).await.unwrap();
    hx.engine
        .handle_event(text(&op, "Blue widget"))
        .await
        .unwrap();
    let replies = hx.engine.handle_event(text(&op, "2")).await.unwrap();
    assert!(replies[0].text.contains("registered for 2"));

    // The photos landed on disk under the media directory.
    for seq in 1..=3u32 {
        let path = hx.dir.path().join("media").join(format!("4321{seq}.jpg"));
        assert!(path.exists(), "missing {}", path.display());
    }

    // An end user redeems the code.
    let user = end_user();
    hx.engine
        .handle_event(callback(&user, "redeem"))
        .await
        .unwrap();
    let replies = hx.engine.handle_event(text(&user, "4321")).await.unwrap();
    assert!(replies[0].text.contains("Blue widget"));

    // Both parties are in the user directory, and the action log exists.
    let record = hx.storage.lookup("4321").await.unwrap().unwrap();
    assert_eq!(record.quantity, 2, "informational redeem does not consume");
    assert!(hx.dir.path().join("logs").join("actions.log").exists());
}

#[tokio::test]
async fn consuming_redemption_decrements_the_real_ledger() {
    let dir = TempDir::new().unwrap();
    let config = StorageConfig {
        database_path: dir
            .path()
            .join("kupona.db")
            .to_string_lossy()
            .into_owned(),
        media_dir: dir.path().join("media").to_string_lossy().into_owned(),
    };
    let storage = Arc::new(SqliteStorage::new(config.clone()));
    storage.initialize().await.unwrap();
    storage.create("1111", "Sticker pack", 1).await.unwrap();

    let engine = DialogueEngine::new(
        storage.clone() as Arc<dyn CodeLedger>,
        storage.clone() as Arc<dyn UserDirectory>,
        Arc::new(FsBlobSink::new(config.media_dir.clone()).unwrap()),
        Arc::new(FileActionLog::new(dir.path().join("logs")).await.unwrap()),
        DialoguePolicy {
            consume_on_redeem: true,
            ..DialoguePolicy::default()
        },
        vec![],
    );

    let user = end_user();
    engine.handle_event(callback(&user, "redeem")).await.unwrap();
    let replies = engine.handle_event(text(&user, "1111")).await.unwrap();
    assert!(replies[0].text.contains("Sticker pack"));
    assert_eq!(storage.lookup("1111").await.unwrap().unwrap().quantity, 0);

    // Second redemption finds the code exhausted.
    engine.handle_event(callback(&user, "redeem")).await.unwrap();
    let replies = engine.handle_event(text(&user, "1111")).await.unwrap();
    assert!(replies[0].text.contains("fully redeemed"));
}
