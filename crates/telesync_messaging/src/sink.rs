//! Outbound chat operations.

use async_trait::async_trait;
use telesync_core::{ConversationId, MessageId, Result};

use crate::message::OutgoingMessage;

/// Send/delete/edit access to a chat platform.
///
/// Every call is independent; failures come back as `SyncError::Transport`
/// (or `AcknowledgmentExpired` from [`MessagingSink::acknowledge`]) and the
/// caller decides whether they matter.
#[async_trait]
pub trait MessagingSink: Send + Sync {
    /// Platform name used in logs.
    fn platform(&self) -> &str;

    async fn send_message(
        &self,
        conversation: ConversationId,
        message: &OutgoingMessage,
    ) -> Result<MessageId>;

    async fn delete_message(&self, conversation: ConversationId, message: MessageId) -> Result<()>;

    async fn edit_message(
        &self,
        conversation: ConversationId,
        message: MessageId,
        content: &OutgoingMessage,
    ) -> Result<()>;

    /// Answer a button press. Stale tokens fail with `AcknowledgmentExpired`.
    async fn acknowledge(&self, callback_id: &str) -> Result<()>;
}
