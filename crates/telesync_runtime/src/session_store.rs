//! Per-conversation refresh state.
//!
//! Each [`ChatSession`] owns the ids of the messages currently displayed in
//! its conversation behind a tokio mutex. Holding that mutex is the gate:
//! refresh cycles for one conversation run strictly one after another while
//! other conversations are untouched.

use std::collections::HashMap;
use std::sync::Arc;

use telesync_core::{ConversationId, MessageId};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::debug;

/// One conversation's live messages and gate.
#[derive(Debug)]
pub struct ChatSession {
    conversation: ConversationId,
    live: Mutex<Vec<MessageId>>,
}

impl ChatSession {
    fn new(conversation: ConversationId) -> Self {
        Self {
            conversation,
            live: Mutex::new(Vec::new()),
        }
    }

    pub fn conversation(&self) -> ConversationId {
        self.conversation
    }

    /// Wait for the gate. Released when the returned guard drops.
    pub async fn lock(&self) -> SessionGate<'_> {
        SessionGate {
            conversation: self.conversation,
            live: self.live.lock().await,
        }
    }

    /// Take the gate only if no refresh currently holds it.
    pub fn try_lock(&self) -> Option<SessionGate<'_>> {
        self.live.try_lock().ok().map(|live| SessionGate {
            conversation: self.conversation,
            live,
        })
    }
}

/// Exclusive access to a session's live message ids.
pub struct SessionGate<'a> {
    conversation: ConversationId,
    live: MutexGuard<'a, Vec<MessageId>>,
}

impl SessionGate<'_> {
    pub fn conversation(&self) -> ConversationId {
        self.conversation
    }

    pub fn current(&self) -> &[MessageId] {
        &self.live
    }

    /// Replace (never append) the live ids, returning the previous ones.
    pub fn replace(&mut self, ids: Vec<MessageId>) -> Vec<MessageId> {
        std::mem::replace(&mut *self.live, ids)
    }

    /// Record a message the moment it was posted.
    pub fn track(&mut self, id: MessageId) {
        self.live.push(id);
    }

    /// Stop tracking a message that is no longer shown.
    pub fn forget(&mut self, id: MessageId) {
        self.live.retain(|&live| live != id);
    }
}

/// Process-wide map of conversation sessions
#[derive(Debug, Default)]
pub struct ChatSessionStore {
    sessions: RwLock<HashMap<ConversationId, Arc<ChatSession>>>,
}

impl ChatSessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `conversation`, created on first use.
    pub async fn get_or_create(&self, conversation: ConversationId) -> Arc<ChatSession> {
        if let Some(session) = self.sessions.read().await.get(&conversation) {
            return Arc::clone(session);
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(conversation).or_insert_with(|| {
            debug!(conversation = %conversation, "Creating chat session");
            Arc::new(ChatSession::new(conversation))
        });
        Arc::clone(session)
    }

    /// Replace a conversation's live ids, waiting for any in-flight refresh.
    pub async fn replace_live_messages(
        &self,
        conversation: ConversationId,
        ids: Vec<MessageId>,
    ) -> Vec<MessageId> {
        let session = self.get_or_create(conversation).await;
        let mut gate = session.lock().await;
        gate.replace(ids)
    }

    /// Snapshot of a conversation's live ids, waiting for any in-flight refresh.
    /// Unknown conversations have none.
    pub async fn current_live_messages(&self, conversation: ConversationId) -> Vec<MessageId> {
        let session = self.sessions.read().await.get(&conversation).cloned();
        match session {
            Some(session) => session.lock().await.current().to_vec(),
            None => Vec::new(),
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
