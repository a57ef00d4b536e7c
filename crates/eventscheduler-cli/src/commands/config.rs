//! Configuration commands.

use std::io::Write;
use std::path::Path;

use eventscheduler_server::{SchedulerConfig, snapshot};

use crate::cli::ConfigAction;
use crate::error::CliResult;

/// Runs a configuration action.
pub fn run<W: Write>(
    action: &ConfigAction,
    config: &SchedulerConfig,
    config_path: Option<&Path>,
    store_path: &Path,
    out: &mut W,
) -> CliResult<()> {
    match action {
        ConfigAction::Dump => dump(config, config_path, out),
        ConfigAction::Validate => validate(store_path, out),
        ConfigAction::Path => path(config_path, store_path, out),
    }
}

/// Dump the current configuration.
pub fn dump<W: Write>(
    config: &SchedulerConfig,
    config_path: Option<&Path>,
    out: &mut W,
) -> CliResult<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(SchedulerConfig::default_path);
    writeln!(out, "# config.toml ({})", config_path.display())?;
    writeln!(out, "{}", config.to_toml()?)?;
    Ok(())
}

/// Validate the configuration and the snapshot it points at.
///
/// The configuration itself was validated when it was loaded.
pub fn validate<W: Write>(store_path: &Path, out: &mut W) -> CliResult<()> {
    let store = snapshot::load(store_path)?;
    writeln!(
        out,
        "Snapshot {} is readable ({} events).",
        store_path.display(),
        store.len()
    )?;
    writeln!(out, "Configuration is valid.")?;
    Ok(())
}

/// Show the configuration and snapshot file paths.
pub fn path<W: Write>(config_path: Option<&Path>, store_path: &Path, out: &mut W) -> CliResult<()> {
    let config_path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(SchedulerConfig::default_path);
    writeln!(out, "config: {}", config_path.display())?;
    writeln!(out, "store: {}", store_path.display())?;
    Ok(())
}
