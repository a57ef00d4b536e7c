//! Core types: occurrences, weekday sets, conflict detection, validation

pub mod conflict;
pub mod occurrence;
pub mod time;
pub mod tracing;
pub mod validation;

pub use conflict::{ConflictChecker, ConflictPolicy, find_conflict, has_conflict, time_overlap};
pub use occurrence::{Occurrence, Weekdays};
pub use time::TimeWindow;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use validation::{
    EventDraft, EventPatch, MAX_DURATION_MINUTES, MAX_NAME_LENGTH, ValidatedEvent,
    ValidationError,
};
