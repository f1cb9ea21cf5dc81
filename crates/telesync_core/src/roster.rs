//! Roster formatting: snapshot ∩ allow-list → ordered display lines.

use serde::{Deserialize, Serialize};
use telesync_constant::texts::CHANNEL_BULLET;

use crate::allow_list::CategoryAllowList;
use crate::directory::DirectorySnapshot;

/// One structural line of the roster. Never split across pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum RosterLine {
    Header(String),
    Channel(String),
}

impl RosterLine {
    pub fn render(&self) -> String {
        match self {
            RosterLine::Header(name) => name.clone(),
            RosterLine::Channel(name) => format!("{CHANNEL_BULLET}{name}"),
        }
    }

    pub fn is_header(&self) -> bool {
        matches!(self, RosterLine::Header(_))
    }
}

/// Formatted roster. `NoMatches` is distinct from a document with one line so
/// callers can post a dedicated notice instead of an empty page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "lines", rename_all = "snake_case")]
pub enum RosterDocument {
    NoMatches,
    Lines(Vec<RosterLine>),
}

impl RosterDocument {
    pub fn is_no_matches(&self) -> bool {
        matches!(self, RosterDocument::NoMatches)
    }

    pub fn lines(&self) -> &[RosterLine] {
        match self {
            RosterDocument::NoMatches => &[],
            RosterDocument::Lines(lines) => lines,
        }
    }

    pub fn rendered_lines(&self) -> Vec<String> {
        self.lines().iter().map(RosterLine::render).collect()
    }

    pub fn header_count(&self) -> usize {
        self.lines().iter().filter(|l| l.is_header()).count()
    }

    /// Full document text, one rendered line per `\n`-separated row.
    pub fn text(&self) -> String {
        self.rendered_lines().join("\n")
    }
}

/// Build the roster for `allow_list` from `snapshot`.
///
/// Categories are emitted in allow-list order, matched by trimmed,
/// case-insensitive name. Missing categories and categories without channels
/// are skipped. Each header shows the allow-list spelling, followed by the
/// category's channels in directory order.
pub fn format_roster(snapshot: &DirectorySnapshot, allow_list: &CategoryAllowList) -> RosterDocument {
    let mut lines = Vec::new();

    for wanted in allow_list.distinct() {
        let Some(category) = snapshot.find_category(wanted) else {
            continue;
        };
        if category.is_empty() {
            continue;
        }
        lines.push(RosterLine::Header(wanted.trim().to_string()));
        lines.extend(
            category
                .channels
                .iter()
                .map(|ch| RosterLine::Channel(ch.name.clone())),
        );
    }

    if lines.is_empty() {
        RosterDocument::NoMatches
    } else {
        RosterDocument::Lines(lines)
    }
}
