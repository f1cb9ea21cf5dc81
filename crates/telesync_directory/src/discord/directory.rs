//! Discord directory source implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use telesync_constant::app;
use telesync_constant::defaults::HTTP_CONNECT_TIMEOUT_SECS;
use telesync_core::{DirectorySnapshot, Result, SyncError};
use telesync_observability::platform_span;
use tracing::{debug, Instrument};

use super::convert::to_snapshot;
use super::types::{DiscordChannel, DiscordConfig, DiscordErrorBody};
use crate::source::DirectorySource;

/// Discord guild directory
pub struct DiscordDirectory {
    config: DiscordConfig,
    client: Client,
}

impl DiscordDirectory {
    pub fn new(config: DiscordConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(format!("DiscordBot ({}, {})", app::NAME, app::VERSION))
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS).min(config.request_timeout))
            .build()
            .map_err(|e| SyncError::config(format!("http client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Create source from environment
    pub fn from_env() -> Result<Self> {
        Self::new(DiscordConfig::from_env()?)
    }
}

#[async_trait]
impl DirectorySource for DiscordDirectory {
    fn source_id(&self) -> &str {
        "discord"
    }

    async fn fetch_snapshot(&self) -> Result<DirectorySnapshot> {
        self.fetch_channels()
            .instrument(platform_span!("discord", "list_guild_channels"))
            .await
            .map(to_snapshot)
    }
}

impl DiscordDirectory {
    async fn fetch_channels(&self) -> Result<Vec<DiscordChannel>> {
        let url = format!(
            "{}/guilds/{}/channels",
            self.config.base_url, self.config.guild_id
        );

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bot {}", self.config.token))
            .send()
            .await
            .map_err(|e| SyncError::transport(format!("discord request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<DiscordErrorBody>(&body)
                .map(|b| format!("{} (code {})", b.message, b.code))
                .unwrap_or(body);
            return Err(match status {
                StatusCode::NOT_FOUND => SyncError::unavailable(format!(
                    "guild {} not found: {}",
                    self.config.guild_id, message
                )),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::unavailable(format!(
                    "access to guild {} denied: {}",
                    self.config.guild_id, message
                )),
                _ => SyncError::transport(format!("Discord API error {}: {}", status, message)),
            });
        }

        let channels: Vec<DiscordChannel> = response
            .json()
            .await
            .map_err(|e| SyncError::transport(format!("invalid channel list: {}", e)))?;
        debug!(guild = %self.config.guild_id, channels = channels.len(), "Fetched guild channels");
        Ok(channels)
    }
}
