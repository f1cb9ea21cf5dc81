//! Ordered category filter, also the roster's display order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::directory::normalize_name;
use crate::error::{Result, SyncError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryAllowList(Vec<String>);

impl CategoryAllowList {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(Into::into).collect())
    }

    /// Parse a `separator`-delimited list; blank entries are dropped.
    pub fn parse(raw: &str, separator: char) -> Self {
        Self(
            raw.split(separator)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.names().all(|name| name.trim().is_empty()) {
            return Err(SyncError::config("category allow-list is empty"));
        }
        Ok(())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Names in order with later duplicates (after normalization) removed.
    pub fn distinct(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.names()
            .filter(|name| seen.insert(normalize_name(name)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CategoryAllowList {
    fn default() -> Self {
        Self::new(telesync_constant::defaults::CATEGORIES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pipe_separated() {
        let list = CategoryAllowList::parse(" Alpha | Beta, Gamma ||  ", '|');
        assert_eq!(list.names().collect::<Vec<_>>(), vec!["Alpha", "Beta, Gamma"]);
    }

    #[test]
    fn test_distinct_keeps_first_spelling() {
        let list = CategoryAllowList::new(["Alpha", "Beta", " ALPHA "]);
        assert_eq!(list.distinct(), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_validate_rejects_empty() {
        assert!(CategoryAllowList::new(Vec::<String>::new()).validate().is_err());
        assert!(CategoryAllowList::new(["  "]).validate().is_err());
        assert!(CategoryAllowList::new(["Alpha"]).validate().is_ok());
    }

    #[test]
    fn test_default_list_is_valid() {
        let list = CategoryAllowList::default();
        assert!(!list.is_empty());
        assert!(list.validate().is_ok());
    }
}
