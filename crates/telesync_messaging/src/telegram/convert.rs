//! Conversion between telesync types and Bot API payloads

use serde_json::{json, Map, Value};
use telesync_core::{ConversationId, InboundEvent};

use super::types::Update;
use crate::message::{Control, OutgoingMessage, TextFormat};

/// Escape text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Build the text/markup fields shared by `sendMessage` and `editMessageText`.
pub fn render_message(message: &OutgoingMessage) -> Map<String, Value> {
    let mut fields = Map::new();
    match message.format {
        TextFormat::Plain => {
            fields.insert("text".into(), Value::String(message.text.clone()));
        }
        TextFormat::Preformatted => {
            fields.insert(
                "text".into(),
                Value::String(format!("<pre>{}</pre>", escape_html(&message.text))),
            );
            fields.insert("parse_mode".into(), Value::String("HTML".into()));
        }
    }
    fields.insert("disable_web_page_preview".into(), Value::Bool(true));

    if message.has_controls() {
        let rows: Vec<Vec<Value>> = message
            .controls
            .iter()
            .filter(|row| !row.is_empty())
            .map(|row| row.iter().map(control_to_button).collect())
            .collect();
        fields.insert("reply_markup".into(), json!({ "inline_keyboard": rows }));
    }
    fields
}

fn control_to_button(control: &Control) -> Value {
    match control {
        Control::Callback { label, data } => json!({ "text": label, "callback_data": data }),
        Control::Link { label, url } => json!({ "text": label, "url": url }),
    }
}

/// Map an update to an inbound event. Updates that carry nothing actionable yield `None`.
pub fn to_inbound(update: &Update) -> Option<InboundEvent> {
    if let Some(query) = &update.callback_query {
        let message = query.message.as_ref()?;
        return Some(InboundEvent::button(
            ConversationId(message.chat.id),
            query.id.clone(),
            query.data.clone().unwrap_or_default(),
        ));
    }

    let message = update.message.as_ref()?;
    let text = message.text.as_deref()?;
    Some(InboundEvent::from_message_text(ConversationId(message.chat.id), text))
}
