//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Mirror a Discord category roster into Telegram chats
#[derive(Parser)]
#[command(name = "telesync", about, version, propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: text (human-readable) or json (machine-readable)
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Colored terminal output for humans
    #[default]
    Text,
    /// JSON lines for scripts
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the bot until Ctrl-C
    Run,
    /// Build the roster and print its pages without posting anything
    Preview {
        /// Read the directory from a JSON snapshot file instead of Discord
        #[arg(long)]
        snapshot: Option<PathBuf>,
        /// Override the page limit (characters)
        #[arg(long)]
        page_limit: Option<usize>,
    },
    /// Show the effective configuration (secrets masked)
    Config,
}
