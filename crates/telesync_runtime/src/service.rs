//! TeleSync: the long-running bot.
//!
//! Wires the directory runtime, the refresh engine and the Telegram update
//! feed together and runs until the shutdown token fires.

use std::sync::Arc;
use std::time::Duration;

use telesync_directory::{ClientConfig, DirectorySource, DiscordDirectory};
use telesync_messaging::telegram::{register_webhook, TelegramApi};
use telesync_messaging::{MessagingSink, TelegramSink, UpdatePoller, WebhookConfig, WebhookServer};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::bridge::spawn_directory_runtime;
use crate::config::RuntimeConfig;
use crate::dispatcher::Dispatcher;
use crate::error::{Result, RuntimeError};
use crate::refresh::RefreshCoordinator;
use crate::session_store::ChatSessionStore;

/// Pause after a failed poll before trying again.
const POLL_BACKOFF: Duration = Duration::from_secs(3);

pub struct TeleSync {
    config: RuntimeConfig,
    client_config: ClientConfig,
    source: Arc<dyn DirectorySource>,
    api: TelegramApi,
    webhook: Option<WebhookConfig>,
}

impl TeleSync {
    /// Long-polling service; see [`TeleSync::with_webhook`] for pushed updates.
    pub fn new(
        config: RuntimeConfig,
        client_config: ClientConfig,
        source: Arc<dyn DirectorySource>,
        api: TelegramApi,
    ) -> Self {
        Self {
            config,
            client_config,
            source,
            api,
            webhook: None,
        }
    }

    /// Receive updates on a webhook server instead of polling.
    pub fn with_webhook(mut self, webhook: WebhookConfig) -> Self {
        self.webhook = Some(webhook);
        self
    }

    /// Discord directory + Telegram bot, everything read from the environment.
    /// Webhook mode is selected by `WEBHOOK_URL`.
    pub fn from_env() -> Result<Self> {
        let config = RuntimeConfig::from_env()?;
        config.validate()?;
        let source: Arc<dyn DirectorySource> = Arc::new(DiscordDirectory::from_env()?);
        let api = TelegramApi::from_env()?;
        let service = Self::new(config, ClientConfig::from_env(), source, api);
        Ok(match WebhookConfig::from_env()? {
            Some(webhook) => service.with_webhook(webhook),
            None => service,
        })
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn webhook(&self) -> Option<&WebhookConfig> {
        self.webhook.as_ref()
    }

    /// Run until `shutdown` is cancelled, then drain in-flight refreshes and
    /// stop the directory runtime.
    pub async fn run(self, shutdown: CancellationToken) -> Result<()> {
        self.config.validate()?;
        if let Some(webhook) = &self.webhook {
            webhook.validate()?;
        }

        let (bridge, directory) = spawn_directory_runtime(self.source, self.client_config)?;
        let sink: Arc<dyn MessagingSink> = Arc::new(TelegramSink::new(self.api.clone()));
        let sessions = Arc::new(ChatSessionStore::new());
        let coordinator = Arc::new(RefreshCoordinator::new(
            self.config,
            sessions,
            bridge,
            Arc::clone(&sink),
        )?);
        let dispatcher = Dispatcher::new(coordinator, sink);

        let intake = match &self.webhook {
            Some(webhook) => serve_webhook(&self.api, webhook, &dispatcher, &shutdown).await,
            None => poll_updates(self.api, &dispatcher, &shutdown).await,
        };

        info!(in_flight = dispatcher.in_flight(), "Shutting down");
        dispatcher.shutdown().await;
        directory.shutdown().await?;
        intake
    }
}

/// Long-poll `getUpdates` until cancelled or a non-recoverable error.
async fn poll_updates(
    api: TelegramApi,
    dispatcher: &Dispatcher,
    shutdown: &CancellationToken,
) -> Result<()> {
    let mut poller = UpdatePoller::new(api);
    poller.prepare().await?;
    info!("TeleSync running, long polling");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => return Ok(()),
            polled = poller.poll() => match polled {
                Ok(events) => {
                    for event in events {
                        dispatcher.dispatch(event).await;
                    }
                }
                Err(e) if !e.is_recoverable() => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "Polling updates failed");
                    tokio::select! {
                        _ = shutdown.cancelled() => return Ok(()),
                        _ = tokio::time::sleep(POLL_BACKOFF) => {}
                    }
                }
            },
        }
    }
}

/// Serve the webhook intake until cancelled or the server stops.
async fn serve_webhook(
    api: &TelegramApi,
    webhook: &WebhookConfig,
    dispatcher: &Dispatcher,
    shutdown: &CancellationToken,
) -> Result<()> {
    let (server, mut events) = WebhookServer::bind(webhook).await?;
    let addr = server.local_addr()?;
    let stop_server = shutdown.child_token();
    let mut serving = tokio::spawn(server.serve(stop_server.clone()));

    if let Err(e) = register_webhook(api, webhook).await {
        stop_server.cancel();
        if let Err(join) = serving.await {
            warn!(error = %join, "Webhook server task failed");
        }
        return Err(e.into());
    }
    info!(%addr, "TeleSync running, webhook intake");

    let finished = loop {
        tokio::select! {
            _ = shutdown.cancelled() => break None,
            served = &mut serving => break Some(served),
            event = events.recv() => match event {
                Some(event) => {
                    dispatcher.dispatch(event).await;
                }
                None => break None,
            },
        }
    };

    stop_server.cancel();
    let served = match finished {
        Some(served) => served,
        None => serving.await,
    };
    match served {
        Ok(result) => result.map_err(RuntimeError::from),
        Err(e) => Err(RuntimeError::TaskFailed(format!("webhook server: {}", e))),
    }
}
