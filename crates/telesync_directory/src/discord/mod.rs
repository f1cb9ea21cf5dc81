//! Discord directory module
//!
//! Reads a guild's category/channel tree over the REST API.
//! API docs: https://discord.com/developers/docs/resources/guild#get-guild-channels

mod convert;
mod directory;
mod types;

pub use convert::to_snapshot;
pub use directory::DiscordDirectory;
pub use types::{ChannelKind, DiscordChannel, DiscordConfig};
