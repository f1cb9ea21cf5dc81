//! telesync_messaging — where the roster is displayed and where refresh triggers come from.
//!
//! [`MessagingSink`] is the outbound seam used by the refresh cycle;
//! [`telegram::UpdatePoller`] (long polling) and [`telegram::WebhookServer`]
//! (pushed updates) turn the platform's update feed into
//! [`telesync_core::InboundEvent`]s.

pub mod message;
pub mod sink;
pub mod telegram;

pub use message::{Control, OutgoingMessage, TextFormat};
pub use sink::MessagingSink;
pub use telegram::{TelegramConfig, TelegramSink, UpdatePoller, WebhookConfig, WebhookServer};
