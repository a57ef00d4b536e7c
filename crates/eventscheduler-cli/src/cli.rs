//! Command-line interface definition.

use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand};

use eventscheduler_core::{EventDraft, EventPatch};
use eventscheduler_server::Request;

/// eventscheduler - Calendar events without double-booking
#[derive(Debug, Parser)]
#[command(name = "eventscheduler")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "EVENTSCHEDULER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the event snapshot file (overrides the configured one)
    #[arg(long, global = true, env = "EVENTSCHEDULER_STORE")]
    pub store: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Also detect overlaps with events that spill past midnight
    #[arg(long, global = true)]
    pub cross_midnight: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create an event
    Add(EventArgs),

    /// Change fields of an existing event
    Update {
        /// Event id
        id: String,

        #[command(flatten)]
        changes: PatchArgs,
    },

    /// Delete an event
    Delete {
        /// Event id
        id: String,

        /// Also print the event at this position in the listing (0 = none)
        #[arg(long, default_value_t = 0)]
        patch_index: usize,
    },

    /// List events, most recently created first
    List {
        /// Page number, starting at 1
        #[arg(long, default_value_t = 1)]
        page: usize,

        /// Events per page (defaults to the configured page size)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one event
    Show {
        /// Event id
        id: String,
    },

    /// Check whether an event would conflict, without saving it
    Check {
        #[command(flatten)]
        event: EventArgs,

        /// Leave this stored event out of the comparison
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Fields describing a new event.
#[derive(Debug, Clone, Args)]
pub struct EventArgs {
    /// Event name
    #[arg(long)]
    pub name: String,

    /// Start time in RFC 3339 form, e.g. 2030-06-03T09:00:00+02:00
    #[arg(long, value_parser = parse_start)]
    pub start: DateTime<FixedOffset>,

    /// Duration in minutes
    #[arg(long, allow_negative_numbers = true)]
    pub duration: i64,

    /// Repeat weekly on these days (0 = Monday ... 6 = Sunday), comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub days: Vec<i64>,
}

impl EventArgs {
    /// Builds the draft; giving any days makes the event recurring.
    pub fn into_draft(self) -> EventDraft {
        let draft = EventDraft::new(self.name, self.start, self.duration);
        if self.days.is_empty() {
            draft
        } else {
            draft.recurring_on(self.days)
        }
    }
}

/// Fields an update may change.
#[derive(Debug, Clone, Args)]
pub struct PatchArgs {
    /// New name
    #[arg(long)]
    pub name: Option<String>,

    /// New start time in RFC 3339 form
    #[arg(long, value_parser = parse_start)]
    pub start: Option<DateTime<FixedOffset>>,

    /// New duration in minutes
    #[arg(long, allow_negative_numbers = true)]
    pub duration: Option<i64>,

    /// Whether the event repeats weekly
    #[arg(long, value_name = "BOOL")]
    pub recurring: Option<bool>,

    /// New repeat days, comma separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub days: Option<Vec<i64>>,
}

impl PatchArgs {
    /// Builds the patch from the flags that were given.
    pub fn into_patch(self) -> EventPatch {
        EventPatch {
            name: self.name,
            start_time: self.start,
            duration: self.duration,
            is_recurring: self.recurring,
            recurring_days: self.days,
        }
    }
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration and snapshot file paths
    Path,
}

impl Command {
    /// Returns the service request for event commands, `None` for the rest.
    pub fn to_request(&self) -> Option<Request> {
        let request = match self {
            Self::Add(event) => Request::create(event.clone().into_draft()),
            Self::Update { id, changes } => Request::update(id, changes.clone().into_patch()),
            Self::Delete { id, patch_index } => Request::delete(id, *patch_index),
            Self::List { page, limit } => Request::list(*page, *limit),
            Self::Show { id } => Request::get(id),
            Self::Check { event, exclude } => {
                let draft = event.clone().into_draft();
                match exclude {
                    Some(id) => Request::check_excluding(draft, id),
                    None => Request::check(draft),
                }
            }
            Self::Config { .. } => return None,
        };
        Some(request)
    }

    /// Returns true if the command changes stored events.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Add(_) | Self::Update { .. } | Self::Delete { .. }
        )
    }
}

fn parse_start(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| format!("expected RFC 3339 time like 2030-06-03T09:00:00+02:00 ({})", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("eventscheduler").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn add_one_time() {
        let cli = parse(&[
            "add",
            "--name",
            "Planning",
            "--start",
            "2030-06-03T09:00:00+02:00",
            "--duration",
            "60",
        ]);
        assert!(cli.command.is_mutation());
        match cli.command.to_request() {
            Some(Request::Create { event }) => {
                assert_eq!(event.name, "Planning");
                assert_eq!(event.duration, 60);
                assert_eq!(event.start_time.offset().local_minus_utc(), 7200);
                assert!(!event.is_recurring);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn add_recurring_days() {
        let cli = parse(&[
            "add",
            "--name",
            "Standup",
            "--start",
            "2030-06-03T09:00:00Z",
            "--duration",
            "15",
            "--days",
            "0,2,4",
        ]);
        match cli.command.to_request() {
            Some(Request::Create { event }) => {
                assert!(event.is_recurring);
                assert_eq!(event.recurring_days, vec![0, 2, 4]);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn rejects_bad_start() {
        let result = Cli::try_parse_from([
            "eventscheduler",
            "add",
            "--name",
            "Planning",
            "--start",
            "tomorrow",
            "--duration",
            "60",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn update_only_given_fields() {
        let cli = parse(&["update", "abc", "--duration", "45", "--recurring", "false"]);
        match cli.command.to_request() {
            Some(Request::Update { id, patch }) => {
                assert_eq!(id, "abc");
                assert_eq!(patch, EventPatch::new().duration(45).recurring(false));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn delete_and_list_defaults() {
        let cli = parse(&["delete", "abc"]);
        assert_eq!(cli.command.to_request(), Some(Request::delete("abc", 0)));

        let cli = parse(&["list"]);
        assert!(!cli.command.is_mutation());
        assert_eq!(cli.command.to_request(), Some(Request::list(1, None)));

        let cli = parse(&["list", "--page", "2", "--limit", "5"]);
        assert_eq!(cli.command.to_request(), Some(Request::list(2, Some(5))));
    }

    #[test]
    fn check_with_exclude() {
        let cli = parse(&[
            "check",
            "--name",
            "Planning",
            "--start",
            "2030-06-03T09:00:00Z",
            "--duration",
            "30",
            "--exclude",
            "abc",
        ]);
        assert!(!cli.command.is_mutation());
        match cli.command.to_request() {
            Some(Request::Check { exclude_id, .. }) => {
                assert_eq!(exclude_id.as_deref(), Some("abc"));
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["list", "--store", "/tmp/events.json", "--cross-midnight"]);
        assert_eq!(cli.store, Some(PathBuf::from("/tmp/events.json")));
        assert!(cli.cross_midnight);
    }

    #[test]
    fn config_has_no_request() {
        let cli = parse(&["config", "path"]);
        assert!(cli.command.to_request().is_none());
    }
}
