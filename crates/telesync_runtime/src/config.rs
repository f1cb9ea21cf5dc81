//! Runtime configuration for telesync

use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use telesync_constant::defaults;
use telesync_core::CategoryAllowList;

use crate::error::{Result, RuntimeError};

/// Settings consumed by the refresh engine
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Categories to show, in display order
    pub allow_list: CategoryAllowList,
    /// Roster page budget in characters
    pub page_limit: usize,
    /// Budget for one snapshot request through the bridge
    pub snapshot_timeout: Duration,
    /// Global cap on simultaneous fetch/post sequences (None = unlimited)
    pub max_concurrent_refreshes: Option<NonZeroUsize>,
    /// Target of the upgrade button in the footer
    pub upgrade_url: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeConfig {
    pub const CATEGORIES_ENV: &'static str = "TELESYNC_CATEGORIES";
    pub const PAGE_LIMIT_ENV: &'static str = "TELESYNC_PAGE_LIMIT";
    pub const SNAPSHOT_TIMEOUT_ENV: &'static str = "TELESYNC_SNAPSHOT_TIMEOUT_SECS";
    pub const MAX_CONCURRENT_ENV: &'static str = "TELESYNC_MAX_CONCURRENT_REFRESHES";
    pub const UPGRADE_URL_ENV: &'static str = "TELESYNC_UPGRADE_URL";

    /// Largest page that still fits one message once wrapped.
    pub const MAX_PAGE_LIMIT: usize = defaults::PLATFORM_MESSAGE_LIMIT - defaults::PAGE_WRAPPER_RESERVE;

    pub fn new() -> Self {
        Self {
            allow_list: CategoryAllowList::default(),
            page_limit: defaults::PAGE_LIMIT,
            snapshot_timeout: Duration::from_secs(defaults::SNAPSHOT_TIMEOUT_SECS),
            max_concurrent_refreshes: None,
            upgrade_url: defaults::UPGRADE_URL.to_string(),
        }
    }

    pub fn with_allow_list(mut self, allow_list: CategoryAllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.page_limit = limit;
        self
    }

    pub fn with_snapshot_timeout(mut self, timeout: Duration) -> Self {
        self.snapshot_timeout = timeout;
        self
    }

    /// Cap concurrent refreshes; 0 removes the cap.
    pub fn with_max_concurrent_refreshes(mut self, max: usize) -> Self {
        self.max_concurrent_refreshes = NonZeroUsize::new(max);
        self
    }

    pub fn with_upgrade_url(mut self, url: impl Into<String>) -> Self {
        self.upgrade_url = url.into();
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep their defaults; unparsable values are errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new();

        if let Ok(raw) = std::env::var(Self::CATEGORIES_ENV) {
            config.allow_list = CategoryAllowList::parse(&raw, defaults::CATEGORY_SEPARATOR);
        }

        if let Some(limit) = parse_env::<usize>(Self::PAGE_LIMIT_ENV)? {
            config.page_limit = limit;
        }

        if let Some(secs) = parse_env::<u64>(Self::SNAPSHOT_TIMEOUT_ENV)? {
            config.snapshot_timeout = Duration::from_secs(secs);
        }

        if let Some(max) = parse_env::<usize>(Self::MAX_CONCURRENT_ENV)? {
            config.max_concurrent_refreshes = NonZeroUsize::new(max);
        }

        if let Ok(url) = std::env::var(Self::UPGRADE_URL_ENV) {
            config.upgrade_url = url.trim().to_string();
        }

        Ok(config)
    }

    /// Reject settings the refresh engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        self.allow_list.validate()?;
        self.page_limit()?;
        if self.snapshot_timeout.is_zero() {
            return Err(RuntimeError::config("snapshot timeout must be positive"));
        }
        if self.upgrade_url.trim().is_empty() {
            return Err(RuntimeError::config("upgrade URL is empty"));
        }
        Ok(())
    }

    /// Page limit as a checked non-zero value.
    pub fn page_limit(&self) -> Result<NonZeroUsize> {
        let limit = NonZeroUsize::new(self.page_limit)
            .ok_or_else(|| RuntimeError::config("page limit must be positive"))?;
        if limit.get() > Self::MAX_PAGE_LIMIT {
            return Err(RuntimeError::config(format!(
                "page limit {} exceeds the platform maximum of {}",
                limit,
                Self::MAX_PAGE_LIMIT
            )));
        }
        Ok(limit)
    }
}

fn parse_env<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| RuntimeError::config(format!("{} must be a number, got '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_config_new() {
        let config = RuntimeConfig::new();
        assert_eq!(config.page_limit, 4000);
        assert_eq!(config.snapshot_timeout, Duration::from_secs(25));
        assert_eq!(config.max_concurrent_refreshes, None);
        assert_eq!(config.allow_list.len(), defaults::CATEGORIES.len());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_runtime_config_builder() {
        let config = RuntimeConfig::new()
            .with_allow_list(CategoryAllowList::new(["Alpha"]))
            .with_page_limit(70)
            .with_snapshot_timeout(Duration::from_millis(200))
            .with_max_concurrent_refreshes(2)
            .with_upgrade_url("https://example.com/vip");

        assert_eq!(config.allow_list.names().collect::<Vec<_>>(), vec!["Alpha"]);
        assert_eq!(config.page_limit().unwrap().get(), 70);
        assert_eq!(config.max_concurrent_refreshes.map(NonZeroUsize::get), Some(2));
        assert_eq!(config.upgrade_url, "https://example.com/vip");

        let unlimited = config.with_max_concurrent_refreshes(0);
        assert_eq!(unlimited.max_concurrent_refreshes, None);
    }

    #[test]
    fn test_validate_page_limit() {
        assert!(RuntimeConfig::new().with_page_limit(0).validate().is_err());
        assert!(RuntimeConfig::new().with_page_limit(4096).validate().is_err());
        assert!(RuntimeConfig::new()
            .with_page_limit(RuntimeConfig::MAX_PAGE_LIMIT)
            .validate()
            .is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_allow_list() {
        let config = RuntimeConfig::new().with_allow_list(CategoryAllowList::new(Vec::<String>::new()));
        assert!(matches!(config.validate(), Err(RuntimeError::Sync(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = RuntimeConfig::new().with_snapshot_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(RuntimeError::Config(_))));
    }
}
