//! Directory source trait and the in-memory implementation.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use telesync_core::{DirectorySnapshot, Result, SyncError};

/// Read access to a hierarchical directory of categories and channels.
///
/// Implementations never mutate the directory.
#[async_trait]
pub trait DirectorySource: Send + Sync {
    /// Short identifier used in logs.
    fn source_id(&self) -> &str;

    /// Fetch the current category/channel tree. An empty directory is
    /// an empty snapshot, not an error.
    async fn fetch_snapshot(&self) -> Result<DirectorySnapshot>;
}

/// Fixed snapshot, optionally served after a delay.
#[derive(Debug, Clone)]
pub struct StaticDirectory {
    snapshot: DirectorySnapshot,
    delay: Option<Duration>,
}

impl StaticDirectory {
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        Self {
            snapshot,
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Load a JSON-encoded `DirectorySnapshot`.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SyncError::config(format!("cannot read {}: {}", path.display(), e)))?;
        let snapshot: DirectorySnapshot = serde_json::from_str(&raw)?;
        Ok(Self::new(snapshot))
    }
}

#[async_trait]
impl DirectorySource for StaticDirectory {
    fn source_id(&self) -> &str {
        "static"
    }

    async fn fetch_snapshot(&self) -> Result<DirectorySnapshot> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.snapshot.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telesync_core::Category;

    #[tokio::test]
    async fn test_static_directory_returns_snapshot() {
        let snapshot = DirectorySnapshot::empty().with_category(Category::new("A").with_channel("a"));
        let source = StaticDirectory::new(snapshot.clone());
        assert_eq!(source.fetch_snapshot().await.unwrap(), snapshot);
        assert_eq!(source.source_id(), "static");
    }

    #[tokio::test]
    async fn test_static_directory_empty_root() {
        let source = StaticDirectory::new(DirectorySnapshot::empty());
        assert!(source.fetch_snapshot().await.unwrap().is_empty());
    }

    #[test]
    fn test_from_json_file_missing() {
        let err = StaticDirectory::from_json_file(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, SyncError::Config(_)));
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("telesync-snapshot-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"categories":[{"name":"Alpha","channels":[{"name":"x"}]}]}"#).unwrap();
        let source = StaticDirectory::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(source.snapshot.channel_count(), 1);
    }
}
