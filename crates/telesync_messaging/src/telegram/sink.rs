//! Telegram implementation of [`MessagingSink`]

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use telesync_core::{ConversationId, MessageId, Result};
use tracing::debug;

use super::api::TelegramApi;
use super::convert::render_message;
use super::types::TelegramConfig;
use crate::message::OutgoingMessage;
use crate::sink::MessagingSink;

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Chat sink backed by the Bot API
#[derive(Clone)]
pub struct TelegramSink {
    api: TelegramApi,
}

impl TelegramSink {
    pub fn new(api: TelegramApi) -> Self {
        Self { api }
    }

    pub fn from_config(config: TelegramConfig) -> Result<Self> {
        Ok(Self::new(TelegramApi::new(config)?))
    }

    pub fn from_env() -> Result<Self> {
        Ok(Self::new(TelegramApi::from_env()?))
    }
}

#[async_trait]
impl MessagingSink for TelegramSink {
    fn platform(&self) -> &str {
        "telegram"
    }

    async fn send_message(
        &self,
        conversation: ConversationId,
        message: &OutgoingMessage,
    ) -> Result<MessageId> {
        let mut body = render_message(message);
        body.insert("chat_id".into(), json!(conversation.0));

        let sent: SentMessage = self.api.call("sendMessage", &Value::Object(body)).await?;
        debug!(chat = %conversation, message = sent.message_id, "Message sent");
        Ok(MessageId(sent.message_id))
    }

    async fn delete_message(&self, conversation: ConversationId, message: MessageId) -> Result<()> {
        let body = json!({ "chat_id": conversation.0, "message_id": message.0 });
        let _: bool = self.api.call("deleteMessage", &body).await?;
        Ok(())
    }

    async fn edit_message(
        &self,
        conversation: ConversationId,
        message: MessageId,
        content: &OutgoingMessage,
    ) -> Result<()> {
        let mut body = render_message(content);
        body.insert("chat_id".into(), json!(conversation.0));
        body.insert("message_id".into(), json!(message.0));

        // Result is the edited Message, or `true` for inline messages.
        let _: Value = self.api.call("editMessageText", &Value::Object(body)).await?;
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<()> {
        let body = json!({ "callback_query_id": callback_id });
        let _: bool = self.api.call("answerCallbackQuery", &body).await?;
        Ok(())
    }
}
