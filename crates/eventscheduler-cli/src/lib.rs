//! CLI for creating, listing and conflict-checking events
//!
//! This crate provides the `eventscheduler` command-line interface. Each
//! invocation loads the JSON snapshot, runs one request through the event
//! service and writes the snapshot back if the request changed anything.

pub mod cli;
pub mod commands;
pub mod error;

pub use cli::Cli;
pub use error::{CliError, CliResult};
