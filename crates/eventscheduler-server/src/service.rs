//! Conflict-checked event operations.
//!
//! Every mutation takes the store's write lock before it looks for conflicts
//! and keeps it until the row is written, so two overlapping creates can never
//! both pass the check.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use eventscheduler_core::{
    ConflictChecker, ConflictPolicy, EventDraft, EventPatch, Occurrence,
};

use crate::config::SchedulerConfig;
use crate::error::{ServerError, ServerResult};
use crate::store::{EventStore, StoredEvent};
use crate::types::{ConflictReport, DeleteOutcome, EventPage};

/// Shared store wrapped in an Arc<RwLock>.
pub type SharedStore = Arc<RwLock<EventStore>>;

/// Creates a new, empty shared store.
pub fn new_shared_store() -> SharedStore {
    Arc::new(RwLock::new(EventStore::new()))
}

/// Source of the current time, used for validation and timestamps.
pub type Clock = fn() -> DateTime<Utc>;

const DEFAULT_LIMIT: usize = 10;

/// Event operations over a shared store.
#[derive(Debug, Clone)]
pub struct EventService {
    store: SharedStore,
    checker: ConflictChecker,
    clock: Clock,
    default_limit: usize,
}

impl EventService {
    /// Creates a service with the strict conflict policy.
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            checker: ConflictChecker::default(),
            clock: Utc::now,
            default_limit: DEFAULT_LIMIT,
        }
    }

    /// Creates a service using the conflict and listing settings of `config`.
    pub fn from_config(store: SharedStore, config: &SchedulerConfig) -> Self {
        Self::new(store)
            .with_policy(config.conflicts)
            .with_default_limit(config.listing.default_limit)
    }

    /// Builder: set the conflict policy.
    pub fn with_policy(mut self, policy: ConflictPolicy) -> Self {
        self.checker = ConflictChecker::new(policy);
        self
    }

    /// Builder: set the clock.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Builder: set the page size used when a listing gives none.
    pub fn with_default_limit(mut self, limit: usize) -> Self {
        self.default_limit = limit.max(1);
        self
    }

    /// Returns the shared store.
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Returns the conflict policy in use.
    pub fn policy(&self) -> ConflictPolicy {
        self.checker.policy()
    }

    /// Validates and stores a new event.
    ///
    /// Fails with [`ServerError::Conflict`] naming the first stored event the
    /// new one overlaps.
    pub async fn create(&self, draft: EventDraft) -> ServerResult<StoredEvent> {
        let now = (self.clock)();
        let event = draft.validate(now)?;
        let id = Uuid::new_v4().to_string();

        let mut store = self.store.write().await;
        let candidate = event.occurrence(&id);
        if let Some(conflicting_id) = self.first_conflict(&store, &candidate, None) {
            warn!(name = %event.name, conflicting_id = %conflicting_id, "Rejected overlapping event");
            return Err(ServerError::conflict(conflicting_id));
        }

        let stored = StoredEvent::new(id, event, now);
        store.insert(stored.clone());
        info!(id = %stored.id, name = %stored.name, "Created event");
        Ok(stored)
    }

    /// Applies a partial update to a stored event.
    ///
    /// The merged event is validated and checked against every other event;
    /// the event's own stored row is excluded from the check.
    pub async fn update(&self, id: &str, patch: EventPatch) -> ServerResult<StoredEvent> {
        let now = (self.clock)();

        let mut store = self.store.write().await;
        let current = store.get(id).ok_or_else(|| ServerError::not_found(id))?;
        let merged = patch.apply(&current.details(), now)?;

        let candidate = merged.occurrence(id);
        if let Some(conflicting_id) = self.first_conflict(&store, &candidate, Some(id)) {
            warn!(id = %id, conflicting_id = %conflicting_id, "Rejected overlapping update");
            return Err(ServerError::conflict(conflicting_id));
        }

        let row = store.get_mut(id).ok_or_else(|| ServerError::not_found(id))?;
        row.apply(merged, now);
        info!(id = %row.id, name = %row.name, "Updated event");
        Ok(row.clone())
    }

    /// Deletes an event.
    ///
    /// When `patch_index` is non-zero, the event at that position in recency
    /// order is looked up before the deletion and returned alongside.
    pub async fn delete(&self, id: &str, patch_index: usize) -> ServerResult<DeleteOutcome> {
        let mut store = self.store.write().await;

        let patch_event = if patch_index != 0 {
            store.nth_recent(patch_index).cloned()
        } else {
            None
        };

        let removed = store.remove(id).ok_or_else(|| ServerError::not_found(id))?;
        info!(id = %removed.id, name = %removed.name, "Deleted event");
        Ok(DeleteOutcome {
            event_id: removed.id,
            patch_event,
        })
    }

    /// Returns one page of events, most recently created first.
    pub async fn list(&self, page: usize, limit: Option<usize>) -> ServerResult<EventPage> {
        if page == 0 {
            return Err(ServerError::invalid_request("page must be at least 1"));
        }
        let limit = limit.unwrap_or(self.default_limit);
        if limit == 0 {
            return Err(ServerError::invalid_request("limit must be at least 1"));
        }

        let store = self.store.read().await;
        let events = store.page(page, limit);
        debug!(page, limit, returned = events.len(), total = store.len(), "Listed events");
        Ok(EventPage {
            events,
            total: store.len(),
            page,
            limit,
        })
    }

    /// Returns a single event.
    pub async fn get(&self, id: &str) -> ServerResult<StoredEvent> {
        let store = self.store.read().await;
        store.get(id).cloned().ok_or_else(|| ServerError::not_found(id))
    }

    /// Validates a draft and reports whether it would conflict, without
    /// storing anything.
    pub async fn check(
        &self,
        draft: EventDraft,
        exclude_id: Option<&str>,
    ) -> ServerResult<ConflictReport> {
        let event = draft.validate((self.clock)())?;
        let candidate = event.occurrence(exclude_id.unwrap_or_default());

        let store = self.store.read().await;
        Ok(match self.first_conflict(&store, &candidate, exclude_id) {
            Some(conflicting_id) => ConflictReport::conflicting(conflicting_id),
            None => ConflictReport::clear(),
        })
    }

    fn first_conflict(
        &self,
        store: &EventStore,
        candidate: &Occurrence,
        exclude_id: Option<&str>,
    ) -> Option<String> {
        let existing: Vec<Occurrence> = store.occurrences().collect();
        self.checker
            .find_conflict(candidate, &existing, exclude_id)
            .map(|occurrence| occurrence.id.clone())
    }
}
