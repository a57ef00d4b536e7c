//! Occurrence descriptors.
//!
//! This module provides the two value types the conflict checker works on:
//! - [`Weekdays`]: a set of weekdays on which a recurring event happens
//! - [`Occurrence`]: an event's timing, built fresh from a stored row or an
//!   incoming payload

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::time::TimeWindow;

const ALL_DAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A set of weekdays, indexed `0..=6` with 0 = Monday.
///
/// Serialized as a sorted list of day indices. Indices outside `0..=6` are
/// dropped on construction, so they can never match a real weekday.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<u8>", into = "Vec<u8>")]
pub struct Weekdays(u8);

impl Weekdays {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Every day of the week.
    pub const ALL: Self = Self(0b111_1111);

    /// Builds a set from day indices, ignoring anything outside `0..=6`.
    pub fn from_indices<I>(indices: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<i64>,
    {
        let mut bits = 0u8;
        for index in indices {
            let index = index.into();
            if (0..7).contains(&index) {
                bits |= 1 << index;
            }
        }
        Self(bits)
    }

    /// Builder: add a weekday.
    #[must_use]
    pub fn with(mut self, day: Weekday) -> Self {
        self.insert(day);
        self
    }

    /// Adds a weekday to the set.
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << day.num_days_from_monday();
    }

    /// Returns `true` if the set contains the given weekday.
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << day.num_days_from_monday()) != 0
    }

    /// Returns `true` if both sets share at least one weekday.
    pub fn intersects(&self, other: Weekdays) -> bool {
        self.0 & other.0 != 0
    }

    /// Returns `true` if no weekday is set.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Returns the number of weekdays in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Moves every weekday forward by `days` (backward when negative).
    #[must_use]
    pub fn rotate(&self, days: i64) -> Self {
        let mut rotated = 0u8;
        for index in 0..7i64 {
            if self.0 & (1 << index) != 0 {
                rotated |= 1 << (index + days).rem_euclid(7);
            }
        }
        Self(rotated)
    }

    /// Iterates over the weekdays in the set, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        ALL_DAYS.into_iter().filter(|day| self.contains(*day))
    }

    /// Returns the day indices in ascending order.
    pub fn indices(&self) -> Vec<u8> {
        self.iter()
            .map(|day| day.num_days_from_monday() as u8)
            .collect()
    }
}

impl fmt::Debug for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<Weekday> for Weekdays {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut days = Self::EMPTY;
        for day in iter {
            days.insert(day);
        }
        days
    }
}

impl From<Vec<u8>> for Weekdays {
    fn from(indices: Vec<u8>) -> Self {
        Self::from_indices(indices)
    }
}

impl From<Weekdays> for Vec<u8> {
    fn from(days: Weekdays) -> Self {
        days.indices()
    }
}

/// The timing of a single calendar event.
///
/// A non-recurring event happens exactly once, at `start_time`. A recurring
/// event repeats every week on each of its `recurring_days`, at the local
/// time of day of `start_time`. Calendar date and weekday are always read in
/// the offset `start_time` was written with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    /// Identifier of the event this occurrence describes.
    pub id: String,
    /// Start of the event (anchor date for one-time events).
    pub start_time: DateTime<FixedOffset>,
    /// Length of the event in minutes.
    pub duration_minutes: i64,
    /// Whether the event repeats weekly.
    pub is_recurring: bool,
    /// Days of the week the event repeats on. Ignored for one-time events.
    #[serde(default)]
    pub recurring_days: Weekdays,
}

impl Occurrence {
    /// Creates a one-time occurrence.
    pub fn one_time(
        id: impl Into<String>,
        start_time: DateTime<FixedOffset>,
        duration_minutes: i64,
    ) -> Self {
        Self {
            id: id.into(),
            start_time,
            duration_minutes,
            is_recurring: false,
            recurring_days: Weekdays::EMPTY,
        }
    }

    /// Creates a weekly occurrence repeating on `days`.
    pub fn weekly(
        id: impl Into<String>,
        start_time: DateTime<FixedOffset>,
        duration_minutes: i64,
        days: Weekdays,
    ) -> Self {
        Self {
            id: id.into(),
            start_time,
            duration_minutes,
            is_recurring: true,
            recurring_days: days,
        }
    }

    /// Returns the calendar date of `start_time`.
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    /// Returns the anchor occurrence as a time window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::from_minutes(&self.start_time, self.duration_minutes)
    }

    /// Returns the window this event would occupy if it started on `date`.
    ///
    /// Local time of day and offset are kept, so a late window extends past
    /// midnight into the following day rather than wrapping around.
    pub fn window_on(&self, date: NaiveDate) -> TimeWindow {
        self.window().shift_days((date - self.date()).num_days())
    }

    /// Returns `true` if the event happens on `date`.
    ///
    /// One-time events only happen on their start date; recurring events on
    /// every date whose weekday is in `recurring_days`.
    pub fn occurs_on(&self, date: NaiveDate) -> bool {
        if self.is_recurring {
            self.recurring_days.contains(date.weekday())
        } else {
            date == self.date()
        }
    }
}
