use std::time::Duration;

use thiserror::Error;

/// Failure taxonomy shared by the directory, messaging and runtime crates.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The directory source has not finished its initial sync.
    #[error("directory not ready")]
    NotReady,

    #[error("snapshot request timed out after {0:?}")]
    Timeout(Duration),

    /// A send/delete/edit/ack call failed on the wire or was rejected.
    #[error("transport error: {0}")]
    Transport(String),

    #[error("config error: {0}")]
    Config(String),

    /// The button-press token is stale and can no longer be answered.
    #[error("acknowledgment expired: {0}")]
    AcknowledgmentExpired(String),

    /// The directory runtime is gone or the directory cannot be read at all.
    #[error("directory unavailable: {0}")]
    Unavailable(String),

    #[error("json error: {0}")]
    Json(String),
}

impl SyncError {
    pub fn transport(message: impl Into<String>) -> Self {
        SyncError::Transport(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        SyncError::Config(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        SyncError::Unavailable(message.into())
    }

    /// Whether retrying the same operation later can succeed.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, SyncError::Config(_))
    }
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Json(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
