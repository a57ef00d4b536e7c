//! Command implementations.

pub mod config;
pub mod events;

use std::io::Write;
use std::path::Path;

use eventscheduler_server::SchedulerConfig;

use crate::cli::{Cli, Command};
use crate::error::CliResult;

/// Loads configuration from `path`, or from the default location.
///
/// An explicit path must exist; a missing default file yields defaults.
pub fn load_config(path: Option<&Path>) -> CliResult<SchedulerConfig> {
    let config = match path {
        Some(path) => SchedulerConfig::load_from(path)?,
        None => SchedulerConfig::load()?,
    };
    Ok(config)
}

/// Runs one parsed command line, writing results to `out`.
pub async fn run<W: Write>(cli: Cli, config: SchedulerConfig, out: &mut W) -> CliResult<()> {
    let store_path = cli.store.clone().unwrap_or_else(|| config.store_path());

    if let Command::Config { action } = &cli.command {
        return config::run(action, &config, cli.config.as_deref(), &store_path, out);
    }

    let mut policy = config.conflicts;
    if cli.cross_midnight {
        policy.cross_midnight = true;
    }

    match cli.command.to_request() {
        Some(request) => {
            let service = events::open_service(&config, policy, &store_path)?;
            events::execute(service, &request, cli.command.is_mutation(), &store_path, out).await
        }
        None => Ok(()),
    }
}
