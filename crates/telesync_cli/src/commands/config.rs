//! `telesync config`: effective configuration, secrets masked.

use anyhow::Result;
use telesync_directory::{ClientConfig, DiscordConfig};
use telesync_messaging::{TelegramConfig, WebhookConfig};
use telesync_runtime::RuntimeConfig;

use crate::output::{self, Tone};

pub fn handle() -> Result<()> {
    let runtime = RuntimeConfig::from_env()?;
    let client = ClientConfig::from_env();

    let secret = |name: &str| match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => mask_key(value.trim()),
        _ => "(not set)".to_string(),
    };
    let plain = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.to_string());

    let rows: Vec<(String, String)> = vec![
        (DiscordConfig::TOKEN_ENV.into(), secret(DiscordConfig::TOKEN_ENV)),
        (
            DiscordConfig::GUILD_ENV.into(),
            plain(DiscordConfig::GUILD_ENV, "(not set)"),
        ),
        (
            DiscordConfig::BASE_URL_ENV.into(),
            plain(DiscordConfig::BASE_URL_ENV, telesync_constant::defaults::DISCORD_API_BASE),
        ),
        (TelegramConfig::TOKEN_ENV.into(), secret(TelegramConfig::TOKEN_ENV)),
        (
            WebhookConfig::URL_ENV.into(),
            plain(WebhookConfig::URL_ENV, "(not set, long polling)"),
        ),
        (
            WebhookConfig::PORT_ENV.into(),
            plain(WebhookConfig::PORT_ENV, &telesync_constant::defaults::WEBHOOK_PORT.to_string()),
        ),
        (WebhookConfig::SECRET_ENV.into(), secret(WebhookConfig::SECRET_ENV)),
        (
            TelegramConfig::BASE_URL_ENV.into(),
            plain(TelegramConfig::BASE_URL_ENV, telesync_constant::defaults::TELEGRAM_API_BASE),
        ),
        ("categories".into(), runtime.allow_list.names().collect::<Vec<_>>().join(" | ")),
        ("page limit".into(), runtime.page_limit.to_string()),
        (
            "snapshot timeout".into(),
            format!("{}s", runtime.snapshot_timeout.as_secs()),
        ),
        (
            "max concurrent refreshes".into(),
            runtime
                .max_concurrent_refreshes
                .map(|n| n.to_string())
                .unwrap_or_else(|| "unlimited".into()),
        ),
        ("upgrade url".into(), runtime.upgrade_url.clone()),
        ("sync interval".into(), format!("{}s", client.sync_interval.as_secs())),
        ("max staleness".into(), format!("{}s", client.max_staleness.as_secs())),
        ("wait for ready".into(), client.wait_for_ready.to_string()),
    ];

    output::settings(&rows);

    if let Err(e) = runtime.validate() {
        output::say(Tone::Warn, &e.to_string());
    }
    Ok(())
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("short"), "*****");
        assert_eq!(mask_key("123456:ABCDEFGHIJ"), "1234...GHIJ");
    }
}
