//! Telegram Bot API adapter

mod api;
mod convert;
mod sink;
mod types;
mod updates;
mod webhook;

pub use api::TelegramApi;
pub use convert::{escape_html, render_message, to_inbound};
pub use sink::TelegramSink;
pub use types::{CallbackQuery, Chat, TelegramConfig, TelegramMessage, Update};
pub use updates::UpdatePoller;
pub use webhook::{register_webhook, webhook_router, WebhookConfig, WebhookServer, WEBHOOK_PATH};
