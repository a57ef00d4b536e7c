//! eventscheduler CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use eventscheduler_cli::Cli;
use eventscheduler_cli::commands;
use eventscheduler_core::{TracingConfig, init_tracing};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let debug = cli.debug || config.debug;
    let tracing_config = if cli.log_json {
        let service = TracingConfig::service();
        if debug {
            service.with_level(Level::DEBUG)
        } else {
            service
        }
    } else if debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::cli()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    let mut stdout = std::io::stdout().lock();
    match commands::run(cli, config, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
