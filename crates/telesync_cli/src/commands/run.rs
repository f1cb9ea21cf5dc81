//! `telesync run`: the long-running bot.

use anyhow::{Context, Result};
use telesync_constant::app;
use telesync_runtime::TeleSync;
use tokio_util::sync::CancellationToken;

use crate::output::{self, Tone};

pub async fn handle(verbose: bool) -> Result<()> {
    super::init_logging(verbose, "info")?;

    let service = TeleSync::from_env().context("loading configuration")?;
    output::say(Tone::Heading, &format!("{} {}", app::DISPLAY_NAME, app::VERSION));
    output::field("categories", &service.config().allow_list.len().to_string());
    output::field("page limit", &service.config().page_limit.to_string());
    match service.webhook() {
        Some(webhook) => output::field("updates", &format!("webhook {} on {}", webhook.url, webhook.bind)),
        None => output::field("updates", "long polling"),
    }
    output::say(Tone::Note, "Press Ctrl-C to stop.");

    let shutdown = CancellationToken::new();
    let on_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let result = service.run(shutdown).await;
    telesync_observability::shutdown();
    result?;

    output::say(Tone::Done, "Stopped");
    Ok(())
}
