//! In-memory event storage.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use eventscheduler_core::{Occurrence, ValidatedEvent, Weekdays};

/// A persisted event row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// UUID v4 identifier.
    pub id: String,
    /// Event name.
    pub name: String,
    /// Event start.
    pub start_time: DateTime<FixedOffset>,
    /// Duration in minutes.
    pub duration: u32,
    /// Whether the event repeats weekly.
    pub is_recurring: bool,
    /// Days the event repeats on.
    #[serde(default)]
    pub recurring_days: Weekdays,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
    /// When the event was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StoredEvent {
    /// Creates a row from a validated event.
    pub fn new(id: impl Into<String>, event: ValidatedEvent, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: event.name,
            start_time: event.start_time,
            duration: event.duration_minutes,
            is_recurring: event.is_recurring,
            recurring_days: event.recurring_days,
            created_at,
            updated_at: None,
        }
    }

    /// Returns the validated fields, the base an update patch is merged onto.
    pub fn details(&self) -> ValidatedEvent {
        ValidatedEvent {
            name: self.name.clone(),
            start_time: self.start_time,
            duration_minutes: self.duration,
            is_recurring: self.is_recurring,
            recurring_days: self.recurring_days,
        }
    }

    /// Builds the occurrence descriptor used for conflict checks.
    pub fn occurrence(&self) -> Occurrence {
        Occurrence {
            id: self.id.clone(),
            start_time: self.start_time,
            duration_minutes: i64::from(self.duration),
            is_recurring: self.is_recurring,
            recurring_days: self.recurring_days,
        }
    }

    /// Overwrites the event fields and stamps `updated_at`.
    pub fn apply(&mut self, event: ValidatedEvent, updated_at: DateTime<Utc>) {
        self.name = event.name;
        self.start_time = event.start_time;
        self.duration = event.duration_minutes;
        self.is_recurring = event.is_recurring;
        self.recurring_days = event.recurring_days;
        self.updated_at = Some(updated_at);
    }
}

/// Events kept in insertion order.
///
/// Listing is by `created_at` descending; among equal timestamps the later
/// insertion comes first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStore {
    events: Vec<StoredEvent>,
}

impl EventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from rows in insertion order.
    pub fn from_events(events: Vec<StoredEvent>) -> Self {
        Self { events }
    }

    /// Returns the rows in insertion order.
    pub fn events(&self) -> &[StoredEvent] {
        &self.events
    }

    /// Returns the number of stored events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if no events are stored.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Looks up an event by id.
    pub fn get(&self, id: &str) -> Option<&StoredEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Looks up an event by id for modification.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut StoredEvent> {
        self.events.iter_mut().find(|e| e.id == id)
    }

    /// Appends an event.
    pub fn insert(&mut self, event: StoredEvent) {
        self.events.push(event);
    }

    /// Removes an event by id, returning it.
    pub fn remove(&mut self, id: &str) -> Option<StoredEvent> {
        let index = self.events.iter().position(|e| e.id == id)?;
        Some(self.events.remove(index))
    }

    /// Returns all events, most recently created first.
    pub fn recent(&self) -> Vec<&StoredEvent> {
        let mut events: Vec<_> = self.events.iter().rev().collect();
        // stable sort keeps later insertions ahead on equal timestamps
        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        events
    }

    /// Returns the event at `index` in recency order.
    pub fn nth_recent(&self, index: usize) -> Option<&StoredEvent> {
        self.recent().into_iter().nth(index)
    }

    /// Returns one page of events in recency order.
    ///
    /// Pages are 1-based; page 0 is treated as page 1.
    pub fn page(&self, page: usize, limit: usize) -> Vec<StoredEvent> {
        let skip = page.saturating_sub(1).saturating_mul(limit);
        self.recent()
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Builds occurrence descriptors for every stored event.
    pub fn occurrences(&self) -> impl Iterator<Item = Occurrence> + '_ {
        self.events.iter().map(StoredEvent::occurrence)
    }
}
