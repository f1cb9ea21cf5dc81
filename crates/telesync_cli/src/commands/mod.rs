//! Command dispatch.

pub mod config;
pub mod preview;
pub mod run;

use anyhow::Result;

use crate::cli::{Cli, Command};

pub async fn handle(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run => run::handle(cli.verbose).await,
        Command::Preview {
            snapshot,
            page_limit,
        } => preview::handle(snapshot, page_limit, cli.verbose).await,
        Command::Config => config::handle(),
    }
}

/// Install logging. Quiet by default for one-shot commands.
pub(crate) fn init_logging(verbose: bool, default_level: &str) -> Result<()> {
    let mut config = telesync_observability::ObservabilityConfig::from_env();
    if verbose {
        config = config.with_log_level("debug");
    } else if config.log_level.is_none() {
        config = config.with_log_level(default_level);
    }
    telesync_observability::init(config)?;
    Ok(())
}
