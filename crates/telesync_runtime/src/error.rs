//! Runtime error types

use telesync_core::SyncError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn config(message: impl Into<String>) -> Self {
        RuntimeError::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
