//! Application metadata constants

pub const NAME: &str = "telesync";
pub const DISPLAY_NAME: &str = "TeleSync";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = "Mirror a Discord category roster into Telegram chats";

/// Directory name for telesync config within a project or home dir
pub const DATA_DIR: &str = ".telesync";
/// Env file inside DATA_DIR
pub const ENV_FILE: &str = "env";
