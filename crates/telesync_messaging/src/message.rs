//! Platform-neutral outgoing message model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    #[default]
    Plain,
    /// Monospaced block; the sink escapes the text for its markup.
    Preformatted,
}

/// Inline control attached under a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    /// Button that comes back as an inbound `Button` event carrying `data`.
    Callback { label: String, data: String },
    Link { label: String, url: String },
}

impl Control {
    pub fn callback(label: impl Into<String>, data: impl Into<String>) -> Self {
        Control::Callback {
            label: label.into(),
            data: data.into(),
        }
    }

    pub fn link(label: impl Into<String>, url: impl Into<String>) -> Self {
        Control::Link {
            label: label.into(),
            url: url.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    #[serde(default)]
    pub format: TextFormat,
    /// Rows of inline controls.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<Vec<Control>>,
}

impl OutgoingMessage {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            controls: Vec::new(),
        }
    }

    pub fn preformatted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Preformatted,
            controls: Vec::new(),
        }
    }

    pub fn with_controls(mut self, row: Vec<Control>) -> Self {
        self.controls.push(row);
        self
    }

    pub fn has_controls(&self) -> bool {
        self.controls.iter().any(|row| !row.is_empty())
    }
}
