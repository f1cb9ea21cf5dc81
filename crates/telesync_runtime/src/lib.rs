//! telesync_runtime — refresh engine and service wiring.
//!
//! - **bridge** — snapshot requests from the messaging runtime into the directory runtime
//! - **session_store** — per-conversation live message ids and the gate serializing refreshes
//! - **refresh** — one refresh cycle: retire, placeholder, fetch, format, paginate, post, commit
//! - **dispatcher** — inbound events to tracked refresh tasks
//! - **service** — `TeleSync`, the long-running bot

pub mod bridge;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod footer;
pub mod refresh;
pub mod service;
pub mod session_store;

#[cfg(test)]
mod tests;

pub use bridge::{spawn_directory_runtime, DirectoryRuntime, RuntimeBridge};
pub use config::RuntimeConfig;
pub use dispatcher::Dispatcher;
pub use error::{Result, RuntimeError};
pub use refresh::RefreshCoordinator;
pub use service::TeleSync;
pub use session_store::{ChatSession, ChatSessionStore, SessionGate};
