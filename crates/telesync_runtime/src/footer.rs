//! Trailer posted after the roster pages.

use chrono::{DateTime, Utc};
use telesync_constant::{defaults, texts};
use telesync_messaging::{Control, OutgoingMessage};

/// Footer with the update timestamp plus the refresh and upgrade buttons.
pub fn footer_message(updated_at: DateTime<Utc>, upgrade_url: &str) -> OutgoingMessage {
    let text = format!(
        "{}\n\n{} {}\n\n{}",
        texts::FOOTER_NOTE,
        texts::LAST_UPDATED,
        updated_at.format(texts::TIMESTAMP_FORMAT),
        texts::FOOTER_HINT,
    );

    OutgoingMessage::plain(text).with_controls(vec![
        Control::callback(texts::REFRESH_BUTTON, defaults::REFRESH_CALLBACK),
        Control::link(texts::UPGRADE_BUTTON, upgrade_url),
    ])
}
