//! Default tuning values shared by the runtime and the CLI.

/// Categories mirrored when `TELESYNC_CATEGORIES` is not set, in display order.
pub const CATEGORIES: &[&str] = &[
    "📦 ETHNICITY VAULTS",
    "🧔 MALE CREATORS  / AGENCY",
    "💪 HGF",
    "🎥 NET VIDEO GIRLS",
    "🇨🇳 ASIAN .1",
    "🇨🇳 ASIAN .2",
    "🇲🇽 LATINA .1",
    "🇲🇽 LATINA .2",
    "❄ SNOWBUNNIE .1",
    "❄ SNOWBUNNIE .2",
    "🇮🇳 INDIAN / DESI",
    "🇸🇦 ARAB",
    "🧬 MIXED / LIGHTSKIN",
    "🏴 BLACK",
    "🌺 POLYNESIAN",
    "☠ GOTH / ALT",
    "🏦 VAULT BANKS",
    "🔞 PORN",
    "Uncatagorised Girls",
];

/// Separator for `TELESYNC_CATEGORIES` (category names may contain commas).
pub const CATEGORY_SEPARATOR: char = '|';

/// Hard per-message limit of the messaging platform, in characters.
pub const PLATFORM_MESSAGE_LIMIT: usize = 4096;
/// Characters reserved for the preformatted wrapper around a roster page.
pub const PAGE_WRAPPER_RESERVE: usize = 16;
/// Roster page budget in characters.
pub const PAGE_LIMIT: usize = 4000;

pub const SNAPSHOT_TIMEOUT_SECS: u64 = 25;
pub const SYNC_INTERVAL_SECS: u64 = 60;
pub const MAX_STALENESS_SECS: u64 = 30;
pub const POLL_TIMEOUT_SECS: u64 = 30;

/// Whole-request budget for platform HTTP calls other than long polls.
pub const HTTP_TIMEOUT_SECS: u64 = 15;
pub const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Callback payload carried by the refresh button.
pub const REFRESH_CALLBACK: &str = "refresh";
/// Commands that trigger a refresh.
pub const REFRESH_COMMANDS: &[&str] = &["start", "refresh"];

/// Listen port of the webhook intake when `PORT` is not set.
pub const WEBHOOK_PORT: u16 = 5000;

pub const UPGRADE_URL: &str = "https://t.me/YourVIPPaymentBot";

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";
