//! Conversion from Discord channel lists to directory snapshots

use std::collections::HashMap;

use telesync_core::{Category, ChannelRef, DirectorySnapshot};

use super::types::{ChannelKind, DiscordChannel};

/// Group listed channels under their categories.
///
/// Both categories and channels are ordered by `(position, id)`, the order a
/// Discord client displays them in. Channels without a category are not part
/// of any category and are dropped.
pub fn to_snapshot(mut channels: Vec<DiscordChannel>) -> DirectorySnapshot {
    channels.sort_by_key(|c| (c.position, c.snowflake()));

    let mut by_parent: HashMap<&str, Vec<ChannelRef>> = HashMap::new();
    for channel in channels.iter().filter(|c| c.channel_kind().is_listed()) {
        if let Some(parent) = channel.parent_id.as_deref() {
            by_parent
                .entry(parent)
                .or_default()
                .push(ChannelRef::new(channel.name.clone()));
        }
    }

    let categories = channels
        .iter()
        .filter(|c| c.channel_kind() == ChannelKind::Category)
        .map(|c| Category {
            name: c.name.clone(),
            channels: by_parent.remove(c.id.as_str()).unwrap_or_default(),
        })
        .collect();

    DirectorySnapshot::new(categories)
}
