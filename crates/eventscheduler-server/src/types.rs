//! Request and response messages for the event service.
//!
//! Both enums are internally tagged with a snake_case `type` field:
//!
//! ```json
//! {"type": "delete", "id": "7f0c...", "patch_index": 1}
//! {"type": "error", "code": "conflict", "message": "..."}
//! ```

use serde::{Deserialize, Serialize};

use eventscheduler_core::{EventDraft, EventPatch};

use crate::error::ServerError;
use crate::store::StoredEvent;

/// A request to the event service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Create an event.
    Create {
        /// The event to create.
        event: EventDraft,
    },

    /// Change some fields of an event.
    Update {
        /// Id of the event to change.
        id: String,
        /// Fields to change.
        #[serde(default)]
        patch: EventPatch,
    },

    /// Delete an event.
    Delete {
        /// Id of the event to delete.
        id: String,
        /// When non-zero, also return the event at this position in
        /// recency order, looked up before the deletion.
        #[serde(default)]
        patch_index: usize,
    },

    /// List events, most recently created first.
    List {
        /// 1-based page number.
        #[serde(default = "default_page")]
        page: usize,
        /// Page size; the configured default when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        limit: Option<usize>,
    },

    /// Fetch a single event.
    Get {
        /// Event id.
        id: String,
    },

    /// Check a draft for conflicts without storing it.
    Check {
        /// The event to check.
        event: EventDraft,
        /// Stored event to leave out of the comparison, typically the one
        /// the draft would replace.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exclude_id: Option<String>,
    },
}

fn default_page() -> usize {
    1
}

impl Request {
    /// Creates a Create request.
    pub fn create(event: EventDraft) -> Self {
        Self::Create { event }
    }

    /// Creates an Update request.
    pub fn update(id: impl Into<String>, patch: EventPatch) -> Self {
        Self::Update {
            id: id.into(),
            patch,
        }
    }

    /// Creates a Delete request.
    pub fn delete(id: impl Into<String>, patch_index: usize) -> Self {
        Self::Delete {
            id: id.into(),
            patch_index,
        }
    }

    /// Creates a List request.
    pub fn list(page: usize, limit: Option<usize>) -> Self {
        Self::List { page, limit }
    }

    /// Creates a Get request.
    pub fn get(id: impl Into<String>) -> Self {
        Self::Get { id: id.into() }
    }

    /// Creates a Check request.
    pub fn check(event: EventDraft) -> Self {
        Self::Check {
            event,
            exclude_id: None,
        }
    }

    /// Creates a Check request that skips one stored event.
    pub fn check_excluding(event: EventDraft, exclude_id: impl Into<String>) -> Self {
        Self::Check {
            event,
            exclude_id: Some(exclude_id.into()),
        }
    }
}

/// A response from the event service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// A single event (create, update, get).
    Event {
        /// The stored event.
        event: StoredEvent,
    },

    /// Result of a delete.
    Deleted {
        /// Deletion details.
        #[serde(flatten)]
        outcome: DeleteOutcome,
    },

    /// A page of events.
    Events {
        /// Page contents.
        #[serde(flatten)]
        page: EventPage,
    },

    /// Result of a dry-run conflict check.
    Check {
        /// Conflict verdict.
        #[serde(flatten)]
        report: ConflictReport,
    },

    /// Error response.
    Error {
        /// Error details.
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl Response {
    /// Creates an Event response.
    pub fn event(event: StoredEvent) -> Self {
        Self::Event { event }
    }

    /// Creates a Deleted response.
    pub fn deleted(outcome: DeleteOutcome) -> Self {
        Self::Deleted { outcome }
    }

    /// Creates an Events response.
    pub fn events(page: EventPage) -> Self {
        Self::Events { page }
    }

    /// Creates a Check response.
    pub fn check(report: ConflictReport) -> Self {
        Self::Check { report }
    }

    /// Creates an Error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse::new(code, message),
        }
    }

    /// Creates an Error response from error details.
    pub fn from_error(error: ErrorResponse) -> Self {
        Self::Error { error }
    }

    /// Returns true unless this is an Error response.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }
}

/// Outcome of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// Id of the deleted event.
    pub event_id: String,
    /// Event found at the requested recency position, if one was asked for
    /// and exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_event: Option<StoredEvent>,
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPage {
    /// Events on this page, most recently created first.
    pub events: Vec<StoredEvent>,
    /// Number of events in the store.
    pub total: usize,
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub limit: usize,
}

/// Conflict verdict for a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// True if the draft overlaps an existing event.
    pub conflict: bool,
    /// First overlapping event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conflicting_id: Option<String>,
}

impl ConflictReport {
    /// A verdict with no conflict.
    pub fn clear() -> Self {
        Self {
            conflict: false,
            conflicting_id: None,
        }
    }

    /// A verdict naming the first conflicting event.
    pub fn conflicting(id: impl Into<String>) -> Self {
        Self {
            conflict: true,
            conflicting_id: Some(id.into()),
        }
    }
}

/// Error codes carried by error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The event payload broke a validation rule.
    ValidationFailed,

    /// Requested event not found.
    NotFound,

    /// The event overlaps an existing one.
    Conflict,

    /// Invalid request format.
    InvalidRequest,

    /// Unknown or internal error.
    InternalError,
}

impl ErrorCode {
    /// Returns a human-readable description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Event not found",
            Self::Conflict => "Event overlaps with existing events",
            Self::InvalidRequest => "The request was invalid",
            Self::InternalError => "An internal error occurred",
        }
    }
}

/// Error response details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<&ServerError> for ErrorResponse {
    fn from(error: &ServerError) -> Self {
        Self::new(error.code(), error.to_string())
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}
