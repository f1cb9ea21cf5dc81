//! Telegram-specific types

use std::time::Duration;

use serde::Deserialize;
use telesync_constant::defaults::{HTTP_TIMEOUT_SECS, POLL_TIMEOUT_SECS, TELEGRAM_API_BASE};
use telesync_core::{Result, SyncError};

/// Configuration for the Telegram adapter
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Bot token from BotFather
    pub token: String,
    /// Base URL (default: https://api.telegram.org)
    pub base_url: String,
    /// Long-poll timeout handed to `getUpdates`
    pub poll_timeout: Duration,
    /// Budget for every other call; a stalled send fails instead of hanging
    pub request_timeout: Duration,
}

impl TelegramConfig {
    pub const TOKEN_ENV: &'static str = "TELEGRAM_BOT_TOKEN";
    pub const BASE_URL_ENV: &'static str = "TELEGRAM_API_BASE";
    pub const POLL_TIMEOUT_ENV: &'static str = "TELESYNC_POLL_TIMEOUT_SECS";

    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            base_url: TELEGRAM_API_BASE.to_string(),
            poll_timeout: Duration::from_secs(POLL_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }

    /// Set base URL; a trailing slash is stripped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self> {
        let token = std::env::var(Self::TOKEN_ENV)
            .map_err(|_| SyncError::config(format!("{} is not set", Self::TOKEN_ENV)))?;

        let mut config = Self::new(token.trim());
        if let Ok(base) = std::env::var(Self::BASE_URL_ENV) {
            config = config.with_base_url(base);
        }
        if let Ok(raw) = std::env::var(Self::POLL_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                SyncError::config(format!("{} must be a number, got '{}'", Self::POLL_TIMEOUT_ENV, raw))
            })?;
            config = config.with_poll_timeout(Duration::from_secs(secs));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(SyncError::config("telegram bot token is empty"));
        }
        if !self.token.contains(':') {
            return Err(SyncError::config(
                "telegram bot token should look like '<bot id>:<secret>'",
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(SyncError::config("telegram request timeout must be positive"));
        }
        Ok(())
    }

    /// Method URL. Contains the token, never log it.
    pub(crate) fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url, self.token, method)
    }
}

/// Envelope every Bot API call answers with.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    /// Absent for buttons on inline-mode messages.
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}
