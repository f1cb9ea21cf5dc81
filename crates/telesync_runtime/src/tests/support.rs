use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use telesync_core::{
    Category, CategoryAllowList, ConversationId, DirectorySnapshot, MessageId, Result, SyncError,
};
use telesync_directory::{ClientConfig, DirectorySource};
use telesync_messaging::{MessagingSink, OutgoingMessage};

use crate::bridge::{spawn_directory_runtime, DirectoryRuntime, RuntimeBridge};
use crate::config::RuntimeConfig;
use crate::refresh::RefreshCoordinator;
use crate::session_store::ChatSessionStore;

pub const CHAT: ConversationId = ConversationId(100);

/// Alpha→[x, y], Beta→[w], Gamma→[z]
pub fn snapshot() -> DirectorySnapshot {
    DirectorySnapshot::empty()
        .with_category(Category::new("Alpha").with_channel("x").with_channel("y"))
        .with_category(Category::new("Beta").with_channel("w"))
        .with_category(Category::new("Gamma").with_channel("z"))
}

pub fn config(categories: &[&str]) -> RuntimeConfig {
    RuntimeConfig::new()
        .with_allow_list(CategoryAllowList::new(categories.iter().copied()))
        .with_snapshot_timeout(Duration::from_secs(2))
        .with_upgrade_url("https://example.com/vip")
}

#[derive(Debug, Clone)]
pub struct Posted {
    pub conversation: ConversationId,
    pub text: String,
    pub deleted: bool,
}

/// In-memory chat platform that records every call.
#[derive(Default)]
pub struct RecordingSink {
    next_id: AtomicI64,
    messages: Mutex<HashMap<MessageId, Posted>>,
    order: Mutex<Vec<MessageId>>,
    acks: Mutex<Vec<String>>,
    fail_marker: Mutex<Option<String>>,
    panic_marker: Mutex<Option<String>>,
    fail_edits: AtomicBool,
    expire_acks: AtomicBool,
    send_delay: Mutex<Option<Duration>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Sends whose text contains `marker` fail with a transport error.
    pub fn fail_sends_containing(&self, marker: &str) {
        *self.fail_marker.lock().unwrap() = Some(marker.to_string());
    }

    /// Sends whose text contains `marker` panic.
    pub fn panic_on_send_containing(&self, marker: &str) {
        *self.panic_marker.lock().unwrap() = Some(marker.to_string());
    }

    /// Sends behave normally again.
    pub fn clear_markers(&self) {
        *self.fail_marker.lock().unwrap() = None;
        *self.panic_marker.lock().unwrap() = None;
    }

    /// Every edit fails with a transport error.
    pub fn fail_edits(&self) {
        self.fail_edits.store(true, Ordering::SeqCst);
    }

    pub fn expire_acknowledgments(&self) {
        self.expire_acks.store(true, Ordering::SeqCst);
    }

    pub fn set_send_delay(&self, delay: Duration) {
        *self.send_delay.lock().unwrap() = Some(delay);
    }

    pub fn text_of(&self, id: MessageId) -> Option<String> {
        self.messages.lock().unwrap().get(&id).map(|m| m.text.clone())
    }

    pub fn is_deleted(&self, id: MessageId) -> bool {
        self.messages
            .lock()
            .unwrap()
            .get(&id)
            .is_some_and(|m| m.deleted)
    }

    /// Messages still shown in `conversation`, in posting order.
    pub fn visible(&self, conversation: ConversationId) -> Vec<MessageId> {
        let messages = self.messages.lock().unwrap();
        self.order
            .lock()
            .unwrap()
            .iter()
            .copied()
            .filter(|id| {
                messages
                    .get(id)
                    .is_some_and(|m| m.conversation == conversation && !m.deleted)
            })
            .collect()
    }

    /// Texts of every message ever posted, in order.
    pub fn sent_texts(&self) -> Vec<String> {
        let messages = self.messages.lock().unwrap();
        self.order
            .lock()
            .unwrap()
            .iter()
            .filter_map(|id| messages.get(id).map(|m| m.text.clone()))
            .collect()
    }

    pub fn acks(&self) -> Vec<String> {
        self.acks.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessagingSink for RecordingSink {
    fn platform(&self) -> &str {
        "recording"
    }

    async fn send_message(
        &self,
        conversation: ConversationId,
        message: &OutgoingMessage,
    ) -> Result<MessageId> {
        let delay = *self.send_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let panic_marker = self.panic_marker.lock().unwrap().clone();
        if let Some(marker) = panic_marker {
            if message.text.contains(&marker) {
                panic!("sink exploded on '{}'", marker);
            }
        }

        let fail_marker = self.fail_marker.lock().unwrap().clone();
        if let Some(marker) = fail_marker {
            if message.text.contains(&marker) {
                return Err(SyncError::transport("send rejected"));
            }
        }

        let id = MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        self.messages.lock().unwrap().insert(
            id,
            Posted {
                conversation,
                text: message.text.clone(),
                deleted: false,
            },
        );
        self.order.lock().unwrap().push(id);
        Ok(id)
    }

    async fn delete_message(&self, conversation: ConversationId, message: MessageId) -> Result<()> {
        let mut messages = self.messages.lock().unwrap();
        match messages.get_mut(&message) {
            Some(posted) if posted.conversation == conversation && !posted.deleted => {
                posted.deleted = true;
                Ok(())
            }
            _ => Err(SyncError::transport("message to delete not found")),
        }
    }

    async fn edit_message(
        &self,
        conversation: ConversationId,
        message: MessageId,
        content: &OutgoingMessage,
    ) -> Result<()> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(SyncError::transport("message can't be edited"));
        }
        let mut messages = self.messages.lock().unwrap();
        match messages.get_mut(&message) {
            Some(posted) if posted.conversation == conversation && !posted.deleted => {
                posted.text = content.text.clone();
                Ok(())
            }
            _ => Err(SyncError::transport("message to edit not found")),
        }
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<()> {
        if self.expire_acks.load(Ordering::SeqCst) {
            return Err(SyncError::AcknowledgmentExpired("query is too old".into()));
        }
        self.acks.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }
}

/// Serves a fixed snapshot after an adjustable delay.
pub struct SwitchableSource {
    snapshot: DirectorySnapshot,
    delay: Mutex<Duration>,
}

impl SwitchableSource {
    pub fn new(snapshot: DirectorySnapshot) -> Arc<Self> {
        Arc::new(Self {
            snapshot,
            delay: Mutex::new(Duration::ZERO),
        })
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }
}

#[async_trait]
impl DirectorySource for SwitchableSource {
    fn source_id(&self) -> &str {
        "switchable"
    }

    async fn fetch_snapshot(&self) -> Result<DirectorySnapshot> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(self.snapshot.clone())
    }
}

/// A directory that never completes a sync.
pub struct UnreachableSource;

#[async_trait]
impl DirectorySource for UnreachableSource {
    fn source_id(&self) -> &str {
        "unreachable"
    }

    async fn fetch_snapshot(&self) -> Result<DirectorySnapshot> {
        Err(SyncError::transport("directory unreachable"))
    }
}

pub struct Harness {
    pub coordinator: Arc<RefreshCoordinator>,
    pub bridge: RuntimeBridge,
    pub sink: Arc<RecordingSink>,
    pub sessions: Arc<ChatSessionStore>,
    pub directory: DirectoryRuntime,
}

/// Coordinator over a live directory runtime; waits for the first sync.
pub async fn harness(
    source: Arc<dyn DirectorySource>,
    config: RuntimeConfig,
    client_config: ClientConfig,
) -> Harness {
    let h = unsynced_harness(source, config, client_config);
    h.bridge.wait_ready(Duration::from_secs(5)).await.unwrap();
    h
}

/// Coordinator over a directory runtime that may not have synced yet.
pub fn unsynced_harness(
    source: Arc<dyn DirectorySource>,
    config: RuntimeConfig,
    client_config: ClientConfig,
) -> Harness {
    let (bridge, directory) = spawn_directory_runtime(source, client_config).unwrap();

    let sink = RecordingSink::new();
    let sessions = Arc::new(ChatSessionStore::new());
    let coordinator = Arc::new(
        RefreshCoordinator::new(
            config,
            Arc::clone(&sessions),
            bridge.clone(),
            Arc::clone(&sink) as Arc<dyn MessagingSink>,
        )
        .unwrap(),
    );

    Harness {
        coordinator,
        bridge,
        sink,
        sessions,
        directory,
    }
}

pub async fn default_harness(categories: &[&str]) -> Harness {
    harness(
        SwitchableSource::new(snapshot()),
        config(categories),
        ClientConfig::new(),
    )
    .await
}
