//! Discord-specific types

use std::time::Duration;

use serde::Deserialize;
use telesync_constant::defaults::{DISCORD_API_BASE, HTTP_TIMEOUT_SECS};
use telesync_core::{Result, SyncError};

/// Configuration for the Discord directory source
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    /// Bot token (sent as `Authorization: Bot <token>`)
    pub token: String,
    /// Guild whose channel tree is mirrored
    pub guild_id: String,
    /// Base URL (default: https://discord.com/api/v10)
    pub base_url: String,
    /// Budget for one channel listing request
    pub request_timeout: Duration,
}

impl DiscordConfig {
    pub const TOKEN_ENV: &'static str = "DISCORD_TOKEN";
    pub const GUILD_ENV: &'static str = "DISCORD_GUILD_ID";
    pub const BASE_URL_ENV: &'static str = "DISCORD_API_BASE";

    pub fn new(token: impl Into<String>, guild_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            guild_id: guild_id.into(),
            base_url: DISCORD_API_BASE.to_string(),
            request_timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
        }
    }

    /// Set base URL; a trailing slash is stripped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn from_env() -> Result<Self> {
        let token = std::env::var(Self::TOKEN_ENV)
            .map_err(|_| SyncError::config(format!("{} is not set", Self::TOKEN_ENV)))?;
        let guild_id = std::env::var(Self::GUILD_ENV)
            .map_err(|_| SyncError::config(format!("{} is not set", Self::GUILD_ENV)))?;

        let mut config = Self::new(token, guild_id.trim());
        if let Ok(base) = std::env::var(Self::BASE_URL_ENV) {
            config = config.with_base_url(base);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() {
            return Err(SyncError::config("discord token is empty"));
        }
        if self.guild_id.is_empty() || !self.guild_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(SyncError::config(format!(
                "guild id must be a numeric snowflake, got '{}'",
                self.guild_id
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(SyncError::config("discord request timeout must be positive"));
        }
        Ok(())
    }
}

/// Channel kinds this source cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    Category,
    Announcement,
    Other(u8),
}

impl From<u8> for ChannelKind {
    fn from(value: u8) -> Self {
        match value {
            0 => ChannelKind::Text,
            4 => ChannelKind::Category,
            5 => ChannelKind::Announcement,
            other => ChannelKind::Other(other),
        }
    }
}

impl ChannelKind {
    /// Text-like channels listed under a category.
    pub fn is_listed(&self) -> bool {
        matches!(self, ChannelKind::Text | ChannelKind::Announcement)
    }
}

/// Guild channel as returned by `GET /guilds/{id}/channels`.
#[derive(Debug, Clone, Deserialize)]
pub struct DiscordChannel {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl DiscordChannel {
    pub fn channel_kind(&self) -> ChannelKind {
        ChannelKind::from(self.kind)
    }

    /// Snowflake as a number for tie-breaking; malformed ids sort first.
    pub fn snowflake(&self) -> u64 {
        self.id.parse().unwrap_or(0)
    }
}

/// Error body returned by the API.
#[derive(Debug, Deserialize)]
pub struct DiscordErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: i64,
}
