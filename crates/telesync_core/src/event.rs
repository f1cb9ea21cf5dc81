use serde::{Deserialize, Serialize};

use crate::ids::{ConversationId, CycleId, MessageId};

/// Something that arrived from the messaging platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEvent {
    pub conversation: ConversationId,
    pub kind: InboundKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundKind {
    /// `/name` with any `@bot` suffix removed.
    Command { name: String },

    /// Inline button press; `callback_id` must be acknowledged separately.
    Button { callback_id: String, data: String },

    Text { text: String },
}

impl InboundEvent {
    pub fn command(conversation: ConversationId, name: impl Into<String>) -> Self {
        Self {
            conversation,
            kind: InboundKind::Command { name: name.into() },
        }
    }

    pub fn button(
        conversation: ConversationId,
        callback_id: impl Into<String>,
        data: impl Into<String>,
    ) -> Self {
        Self {
            conversation,
            kind: InboundKind::Button {
                callback_id: callback_id.into(),
                data: data.into(),
            },
        }
    }

    pub fn text(conversation: ConversationId, text: impl Into<String>) -> Self {
        Self {
            conversation,
            kind: InboundKind::Text { text: text.into() },
        }
    }

    /// Classify a raw chat message: `/cmd@bot args` becomes `Command { name: "cmd" }`.
    pub fn from_message_text(conversation: ConversationId, text: &str) -> Self {
        let trimmed = text.trim();
        if let Some(rest) = trimmed.strip_prefix('/') {
            let word = rest.split_whitespace().next().unwrap_or_default();
            let name = word.split('@').next().unwrap_or_default();
            if !name.is_empty() {
                return Self::command(conversation, name.to_lowercase());
            }
        }
        Self::text(conversation, text)
    }
}

/// How a refresh cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshOutcome {
    Done {
        pages_delivered: usize,
        pages_failed: usize,
    },
    Failed {
        reason: String,
    },
}

impl RefreshOutcome {
    pub fn failed(reason: impl Into<String>) -> Self {
        RefreshOutcome::Failed {
            reason: reason.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, RefreshOutcome::Done { .. })
    }
}

/// Observable result of one refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshReport {
    pub cycle: CycleId,
    pub conversation: ConversationId,
    pub outcome: RefreshOutcome,
    /// Ids committed as the conversation's live messages.
    pub live_messages: Vec<MessageId>,
    /// Old ids that could not be deleted during retirement.
    pub retire_failures: usize,
}

impl RefreshReport {
    pub fn is_done(&self) -> bool {
        self.outcome.is_done()
    }
}
