//! Event service: store, conflict-checked mutations, snapshots, config
//!
//! [`EventService`] owns the event store behind a shared lock and runs every
//! create and update through the conflict checker from `eventscheduler-core`.
//! [`RequestHandler`] exposes the same operations as typed
//! [`Request`]/[`Response`] messages.

pub mod config;
pub mod error;
pub mod handler;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod types;

pub use config::{ListingSettings, SchedulerConfig, StoreSettings};
pub use error::{ServerError, ServerResult};
pub use handler::RequestHandler;
pub use service::{Clock, EventService, SharedStore, new_shared_store};
pub use store::{EventStore, StoredEvent};
pub use types::{
    ConflictReport, DeleteOutcome, ErrorCode, ErrorResponse, EventPage, Request, Response,
};
