//! Low-level Bot API transport shared by the sink and the poller.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use telesync_constant::defaults::HTTP_CONNECT_TIMEOUT_SECS;
use telesync_core::{Result, SyncError};
use telesync_observability::{platform_span, record_error};
use tracing::{debug, Instrument};

use super::types::{ApiResponse, TelegramConfig};

/// Answer descriptions meaning a callback token can no longer be answered.
const EXPIRED_QUERY_MARKERS: &[&str] = &["query is too old", "query id is invalid"];

/// Thin JSON-over-HTTPS client for `POST /bot<token>/<method>`.
#[derive(Clone)]
pub struct TelegramApi {
    config: TelegramConfig,
    client: Client,
}

impl TelegramApi {
    pub fn new(config: TelegramConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS).min(config.request_timeout))
            .build()
            .map_err(|e| SyncError::config(format!("http client: {}", e)))?;
        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(TelegramConfig::from_env()?)
    }

    pub fn config(&self) -> &TelegramConfig {
        &self.config
    }

    pub async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        self.call_with_timeout(method, body, None).await
    }

    /// Same as [`TelegramApi::call`] with a per-request timeout replacing the
    /// client's, for long polls.
    pub async fn call_with_timeout<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let span = platform_span!("telegram", method);
        let result = self.send(method, body, timeout).instrument(span.clone()).await;
        if let Err(e) = &result {
            span.in_scope(|| record_error(e));
        }
        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &Value,
        timeout: Option<Duration>,
    ) -> Result<T> {
        let mut request = self.client.post(self.config.method_url(method)).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        // reqwest errors embed the URL; strip it so the token stays out of logs.
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::transport(format!("telegram {} failed: {}", method, e.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::transport(format!("telegram {} body: {}", method, e.without_url())))?;

        let envelope: ApiResponse<T> = serde_json::from_str(&body).map_err(|e| {
            SyncError::transport(format!("telegram {} returned {} with unreadable body: {}", method, status, e))
        })?;

        if !envelope.ok {
            let description = envelope.description.unwrap_or_else(|| status.to_string());
            debug!(method, code = ?envelope.error_code, %description, "Telegram API rejected call");
            return Err(classify_failure(method, &description));
        }

        envelope
            .result
            .ok_or_else(|| SyncError::transport(format!("telegram {} returned no result", method)))
    }
}

fn classify_failure(method: &str, description: &str) -> SyncError {
    let lowered = description.to_lowercase();
    if method == "answerCallbackQuery" && EXPIRED_QUERY_MARKERS.iter().any(|m| lowered.contains(m)) {
        SyncError::AcknowledgmentExpired(description.to_string())
    } else {
        SyncError::transport(format!("telegram {}: {}", method, description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_expired_query() {
        let err = classify_failure(
            "answerCallbackQuery",
            "Bad Request: query is too old and response timeout expired or query ID is invalid",
        );
        assert!(matches!(err, SyncError::AcknowledgmentExpired(_)));
    }

    #[test]
    fn test_classify_other_failures_as_transport() {
        let err = classify_failure("sendMessage", "Bad Request: chat not found");
        assert!(matches!(err, SyncError::Transport(_)));

        // Same wording on another method is not an acknowledgment problem.
        let err = classify_failure("deleteMessage", "query is too old");
        assert!(matches!(err, SyncError::Transport(_)));
    }
}
