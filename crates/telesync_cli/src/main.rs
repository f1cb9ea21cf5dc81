//! CLI entry point for telesync.

mod cli;
mod commands;
mod output;

use std::path::{Path, PathBuf};

use clap::Parser;
use telesync_constant::app;

use crate::cli::Cli;

/// Walk up from `start` looking for `relative`; nearest match wins.
fn find_upwards(start: &Path, relative: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(32)
        .map(|dir| dir.join(relative))
        .find(|candidate| candidate.exists())
}

/// Load env files into the process environment. Variables already set win.
/// Order: 1) ~/.telesync/env  2) nearest .telesync/env  3) nearest .env
fn load_telesync_config() {
    if let Some(home) = dirs::home_dir() {
        let global = home.join(app::DATA_DIR).join(app::ENV_FILE);
        if global.exists() {
            let _ = dotenvy::from_path(&global);
        }
    }

    let Ok(cwd) = std::env::current_dir() else {
        return;
    };
    let project_env = Path::new(app::DATA_DIR).join(app::ENV_FILE);
    if let Some(path) = find_upwards(&cwd, &project_env) {
        let _ = dotenvy::from_path(&path);
    }
    if let Some(path) = find_upwards(&cwd, Path::new(".env")) {
        let _ = dotenvy::from_path(&path);
    }
}

#[tokio::main]
async fn main() {
    load_telesync_config();
    let cli = Cli::parse();
    output::init(cli.output);

    if let Err(e) = commands::handle(cli).await {
        output::say(output::Tone::Fail, &format!("{:#}", e));
        std::process::exit(1);
    }
}
