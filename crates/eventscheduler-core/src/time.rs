//! Time windows for event occurrences.
//!
//! [`TimeWindow`] is the half-open interval `[start, end)` every overlap
//! decision in the crate is made on. Windows are stored in UTC so that
//! occurrences written with different offsets compare correctly.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A half-open interval `[start, end)` in UTC.
///
/// A window whose end is not after its start is empty and overlaps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// First instant covered.
    pub start: DateTime<Utc>,
    /// First instant after the window.
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds a window from its bounds.
    ///
    /// An `end` before `start` is clamped to `start`, producing an empty window.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Builds a window of the given length.
    ///
    /// An end past the last representable instant saturates to it.
    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> Self {
        Self::new(start, saturating_add(start, duration))
    }

    /// Creates a time window from a start in any timezone and a length in minutes.
    ///
    /// Zero and negative lengths yield an empty window. Lengths too large for
    /// chrono run to the end of time.
    pub fn from_minutes<Tz: TimeZone>(start: &DateTime<Tz>, minutes: i64) -> Self {
        let start = start.with_timezone(&Utc);
        let duration = Duration::try_minutes(minutes.max(0)).unwrap_or(Duration::MAX);
        Self::from_duration(start, duration)
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Returns `true` if the window covers no instant at all.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` if `dt` is at or after `start` and before `end`.
    pub fn contains(&self, dt: DateTime<Utc>) -> bool {
        self.start <= dt && dt < self.end
    }

    /// Checks if two windows share at least one instant.
    ///
    /// Touching windows (one ends exactly when the other starts) do not
    /// overlap, and an empty window overlaps nothing.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.start < other.end && other.start < self.end
    }

    /// Returns the window moved by a whole number of days.
    ///
    /// Bounds pushed outside chrono's range saturate, so a window shifted off
    /// either end of time comes back empty.
    pub fn shift_days(&self, days: i64) -> Self {
        let delta = Duration::try_days(days).unwrap_or(if days < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        });
        Self::new(
            saturating_add(self.start, delta),
            saturating_add(self.end, delta),
        )
    }
}

fn saturating_add(at: DateTime<Utc>, delta: Duration) -> DateTime<Utc> {
    at.checked_add_signed(delta).unwrap_or(if delta < Duration::zero() {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}
