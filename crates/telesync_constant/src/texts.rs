//! User-facing message texts.

pub const LOADING: &str = "⏳ Loading Model channels please wait, this could take 2–5 mins…";
pub const NO_MATCHES: &str = "⚠️ No matching categories found.";
pub const NOT_READY: &str = "⏳ The channel directory is still starting up. Try again shortly.";
pub const TIMEOUT: &str = "❌ Fetching the channel list took too long. Please press Refresh again.";
pub const UNAVAILABLE: &str = "❌ The channel directory is unavailable right now.";
pub const PARTIAL_FAILURE: &str = "⚠️ Some pages of the list could not be delivered";

pub const FOOTER_NOTE: &str = "If you don't see the model you want, no worries – when you purchase VIP, \
let us know who you'd like added and we'll get them ASAP!";
pub const FOOTER_HINT: &str = "Press 🔄 Refresh to update the list. If it doesn’t work, type /start.\n\
Use 💎 Join VIP to upgrade.";
pub const LAST_UPDATED: &str = "Last updated:";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

pub const REFRESH_BUTTON: &str = "🔄 Refresh";
pub const UPGRADE_BUTTON: &str = "💎 Join VIP";

pub const HELP_PROMPT: &str = "🤖 Press 🔄 Refresh or type /start to update the model list.";
pub const ACK_FALLBACK: &str = "⌛ That button has expired. Refreshing anyway – if nothing happens, type /start.";

/// Body of the webhook server's liveness route.
pub const WEBHOOK_ALIVE: &str = "🤖 Bot is alive!";

/// Bullet prefix of a channel line in the roster.
pub const CHANNEL_BULLET: &str = "• ";
