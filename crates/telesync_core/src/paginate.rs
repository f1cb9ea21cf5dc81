//! Greedy line-based pagination under a per-message character budget.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::roster::RosterDocument;

/// Contiguous run of rendered roster lines posted as one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    lines: Vec<String>,
}

impl Chunk {
    fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined with `\n`; this is what gets posted.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// Serialized size in characters.
    pub fn size(&self) -> usize {
        let content: usize = self.lines.iter().map(|l| l.chars().count()).sum();
        content + self.lines.len().saturating_sub(1)
    }

    /// A chunk over the limit is only legal when it holds a single line.
    pub fn is_oversized(&self, limit: NonZeroUsize) -> bool {
        self.size() > limit.get()
    }
}

/// Split `document` into chunks of at most `limit` characters.
///
/// Lines are accumulated in order; a line that would push the running chunk
/// over the limit closes it and starts the next one. A single line longer than
/// the limit becomes its own oversized chunk rather than being cut. Joining the
/// chunk texts with `\n` yields the document text.
pub fn paginate(document: &RosterDocument, limit: NonZeroUsize) -> Vec<Chunk> {
    paginate_lines(document.rendered_lines(), limit)
}

pub fn paginate_lines<I>(lines: I, limit: NonZeroUsize) -> Vec<Chunk>
where
    I: IntoIterator<Item = String>,
{
    let limit = limit.get();
    let mut chunks = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut size = 0usize;

    for line in lines {
        let len = line.chars().count();
        if current.is_empty() {
            size = len;
            current.push(line);
            continue;
        }

        let grown = size + 1 + len;
        if grown > limit {
            chunks.push(Chunk::new(std::mem::take(&mut current)));
            size = len;
        } else {
            size = grown;
        }
        current.push(line);
    }

    if !current.is_empty() {
        chunks.push(Chunk::new(current));
    }

    chunks
}
