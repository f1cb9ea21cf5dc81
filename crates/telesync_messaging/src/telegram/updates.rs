//! Long-polling intake of Telegram updates

use std::time::Duration;

use serde_json::json;
use telesync_core::{InboundEvent, Result};
use tracing::{debug, info};

use super::api::TelegramApi;
use super::convert::to_inbound;
use super::types::Update;

/// Slack on top of the long-poll timeout before the HTTP request gives up.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Pulls updates with `getUpdates` and tracks the confirmation offset.
pub struct UpdatePoller {
    api: TelegramApi,
    offset: i64,
}

impl UpdatePoller {
    pub fn new(api: TelegramApi) -> Self {
        Self { api, offset: 0 }
    }

    /// Remove any webhook so `getUpdates` is allowed.
    pub async fn prepare(&self) -> Result<()> {
        let _: bool = self
            .api
            .call("deleteWebhook", &json!({ "drop_pending_updates": false }))
            .await?;
        info!("Telegram webhook cleared, long polling enabled");
        Ok(())
    }

    /// One long-poll round. Returned updates are confirmed on the next call.
    pub async fn poll(&mut self) -> Result<Vec<InboundEvent>> {
        let timeout = self.api.config().poll_timeout;
        let body = json!({
            "offset": self.offset,
            "timeout": timeout.as_secs(),
            "allowed_updates": ["message", "callback_query"],
        });

        let updates: Vec<Update> = self
            .api
            .call_with_timeout("getUpdates", &body, Some(timeout + POLL_GRACE))
            .await?;

        let mut events = Vec::with_capacity(updates.len());
        for update in &updates {
            self.offset = self.offset.max(update.update_id + 1);
            match to_inbound(update) {
                Some(event) => events.push(event),
                None => debug!(update = update.update_id, "Skipping update without actionable content"),
            }
        }
        Ok(events)
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }
}
