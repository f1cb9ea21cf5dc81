//! Point-in-time view of the directory's category/channel tree.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub name: String,
}

impl ChannelRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// In the order the directory reports them.
    #[serde(default)]
    pub channels: Vec<ChannelRef>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            channels: Vec::new(),
        }
    }

    pub fn with_channel(mut self, name: impl Into<String>) -> Self {
        self.channels.push(ChannelRef::new(name));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Immutable once built; produced fresh for every refresh and dropped after use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl DirectorySnapshot {
    pub fn new(categories: Vec<Category>) -> Self {
        Self { categories }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.categories.iter().map(|c| c.channels.len()).sum()
    }

    /// First category whose name matches `name` after trimming, ignoring case.
    pub fn find_category(&self, name: &str) -> Option<&Category> {
        let wanted = normalize_name(name);
        self.categories
            .iter()
            .find(|c| normalize_name(&c.name) == wanted)
    }
}

/// Match key for category names: surrounding whitespace trimmed, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
