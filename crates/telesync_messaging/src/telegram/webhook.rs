//! Webhook intake
//!
//! Telegram pushes updates to `POST /webhook`; `GET /` (and `HEAD /`) answer
//! health checks of the hosting platform. Updates are converted with the
//! same rules as the long poller and handed out on an mpsc channel.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use telesync_constant::{defaults, texts};
use telesync_core::{InboundEvent, Result, SyncError};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::api::TelegramApi;
use super::convert::to_inbound;
use super::types::Update;

pub const WEBHOOK_PATH: &str = "/webhook";

/// Header Telegram echoes the registered secret in.
const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Converted updates buffered before the HTTP handler waits.
const EVENT_QUEUE: usize = 256;

/// Webhook mode settings
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    /// Public HTTPS URL registered with Telegram
    pub url: String,
    /// Local listen address
    pub bind: SocketAddr,
    /// Shared secret Telegram sends back with every delivery
    pub secret_token: Option<String>,
}

impl WebhookConfig {
    pub const URL_ENV: &'static str = "WEBHOOK_URL";
    pub const PORT_ENV: &'static str = "PORT";
    pub const SECRET_ENV: &'static str = "TELEGRAM_WEBHOOK_SECRET";

    pub fn new(url: impl Into<String>, bind: SocketAddr) -> Self {
        Self {
            url: url.into(),
            bind,
            secret_token: None,
        }
    }

    pub fn with_secret_token(mut self, secret: impl Into<String>) -> Self {
        self.secret_token = Some(secret.into());
        self
    }

    /// `None` when `WEBHOOK_URL` is unset, which selects long polling.
    pub fn from_env() -> Result<Option<Self>> {
        let url = match std::env::var(Self::URL_ENV) {
            Ok(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => return Ok(None),
        };

        let port = match std::env::var(Self::PORT_ENV) {
            Ok(raw) => raw.trim().parse::<u16>().map_err(|_| {
                SyncError::config(format!("{} must be a port number, got '{}'", Self::PORT_ENV, raw))
            })?,
            Err(_) => defaults::WEBHOOK_PORT,
        };

        let mut config = Self::new(url, SocketAddr::from(([0, 0, 0, 0], port)));
        if let Ok(secret) = std::env::var(Self::SECRET_ENV) {
            if !secret.trim().is_empty() {
                config = config.with_secret_token(secret.trim());
            }
        }
        config.validate()?;
        Ok(Some(config))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.url.starts_with("https://") {
            return Err(SyncError::config(format!(
                "{} must be an https:// URL, got '{}'",
                Self::URL_ENV,
                self.url
            )));
        }
        if let Some(secret) = &self.secret_token {
            let allowed = secret
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
            if secret.is_empty() || secret.len() > 256 || !allowed {
                return Err(SyncError::config(
                    "webhook secret must be 1-256 characters of A-Z, a-z, 0-9, _ or -",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone)]
struct WebhookState {
    events: mpsc::Sender<InboundEvent>,
    secret_token: Option<Arc<str>>,
}

/// Routes of the intake server. Events are sent on `events`.
pub fn webhook_router(events: mpsc::Sender<InboundEvent>, secret_token: Option<String>) -> Router {
    let state = WebhookState {
        events,
        secret_token: secret_token.map(Arc::from),
    };
    Router::new()
        .route("/", get(alive))
        .route(WEBHOOK_PATH, post(receive_update))
        .with_state(state)
}

async fn alive() -> &'static str {
    texts::WEBHOOK_ALIVE
}

async fn receive_update(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    Json(update): Json<Update>,
) -> StatusCode {
    if let Some(expected) = &state.secret_token {
        let given = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        if given != Some(expected.as_ref()) {
            warn!(update = update.update_id, "Webhook delivery with wrong secret rejected");
            return StatusCode::UNAUTHORIZED;
        }
    }

    match to_inbound(&update) {
        Some(event) => {
            if state.events.send(event).await.is_err() {
                warn!(update = update.update_id, "Intake closed, update dropped");
                return StatusCode::SERVICE_UNAVAILABLE;
            }
        }
        None => debug!(update = update.update_id, "Skipping update without actionable content"),
    }
    StatusCode::OK
}

/// Bound intake server, not yet serving.
pub struct WebhookServer {
    listener: TcpListener,
    router: Router,
}

impl WebhookServer {
    /// Listen on `config.bind`. Converted updates arrive on the receiver.
    pub async fn bind(config: &WebhookConfig) -> Result<(Self, mpsc::Receiver<InboundEvent>)> {
        let listener = TcpListener::bind(config.bind)
            .await
            .map_err(|e| SyncError::config(format!("cannot listen on {}: {}", config.bind, e)))?;
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE);
        let router = webhook_router(events_tx, config.secret_token.clone());
        Ok((Self { listener, router }, events_rx))
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| SyncError::transport(format!("webhook listener: {}", e)))
    }

    /// Serve until `shutdown` fires. The event channel closes afterwards.
    pub async fn serve(self, shutdown: CancellationToken) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| SyncError::transport(format!("webhook server: {}", e)))
    }
}

/// Point Telegram at `config.url`. Replaces any previous webhook.
pub async fn register_webhook(api: &TelegramApi, config: &WebhookConfig) -> Result<()> {
    let mut body = json!({
        "url": config.url,
        "allowed_updates": ["message", "callback_query"],
    });
    if let Some(secret) = &config.secret_token {
        body["secret_token"] = json!(secret);
    }
    let _: bool = api.call("setWebhook", &body).await?;
    info!(url = %config.url, "Telegram webhook registered");
    Ok(())
}
