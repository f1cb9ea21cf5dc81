//! `telesync preview`: render the roster locally.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde_json::json;
use telesync_core::{format_roster, paginate};
use telesync_directory::{DirectorySource, DiscordDirectory, StaticDirectory};
use telesync_runtime::RuntimeConfig;

use crate::output::{self, Tone};

pub async fn handle(snapshot: Option<PathBuf>, page_limit: Option<usize>, verbose: bool) -> Result<()> {
    super::init_logging(verbose, "warn")?;

    let mut config = RuntimeConfig::from_env()?;
    if let Some(limit) = page_limit {
        config = config.with_page_limit(limit);
    }
    config.validate()?;
    let limit = config.page_limit()?;

    let source: Box<dyn DirectorySource> = match &snapshot {
        Some(path) => Box::new(
            StaticDirectory::from_json_file(path)
                .with_context(|| format!("loading snapshot {}", path.display()))?,
        ),
        None => Box::new(DiscordDirectory::from_env().context("Discord configuration")?),
    };

    let progress = output::Progress::start(&format!("Reading directory from {}...", source.source_id()));
    let directory = match source.fetch_snapshot().await {
        Ok(directory) => {
            progress.done(&format!(
                "{} categories, {} channels",
                directory.categories.len(),
                directory.channel_count()
            ));
            directory
        }
        Err(e) => {
            progress.failed(&e.to_string());
            return Err(e.into());
        }
    };

    let document = format_roster(&directory, &config.allow_list);
    if document.is_no_matches() {
        output::say(Tone::Warn, telesync_constant::texts::NO_MATCHES);
        return Ok(());
    }

    let pages = paginate(&document, limit);
    if output::is_json() {
        let pages: Vec<_> = pages
            .iter()
            .map(|page| json!({ "size": page.size(), "lines": page.lines() }))
            .collect();
        output::data(json!({ "limit": limit.get(), "pages": pages }));
        return Ok(());
    }

    let total = pages.len();
    for (index, page) in pages.iter().enumerate() {
        let oversized = if page.is_oversized(limit) { " (oversized line)" } else { "" };
        output::say(Tone::Heading, &format!(
            "── Page {}/{} · {} chars{}",
            index + 1,
            total,
            page.size(),
            oversized
        ));
        println!("{}", page.text());
        println!();
    }
    output::say(Tone::Note, &format!(
        "{} categories shown, limit {} characters per page",
        document.header_count(),
        limit
    ));
    Ok(())
}
