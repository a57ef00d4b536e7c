//! Conflict detection between event occurrences.
//!
//! The checker answers one question: does a candidate event overlap any
//! existing event? It is a pure function over [`Occurrence`] values. It keeps
//! no state, performs no I/O and never fails.
//!
//! Each pair is decided in two steps. First the two events must happen on
//! matching days:
//!
//! | candidate | existing | day condition |
//! |---|---|---|
//! | one-time | one-time | same start date |
//! | recurring | recurring | weekday sets intersect |
//! | one-time | recurring | candidate's weekday in existing days |
//! | recurring | one-time | existing weekday in candidate days |
//!
//! Then their windows must overlap as half-open intervals. A recurring
//! event's window is projected onto the date being compared, keeping its
//! local time of day, so windows running past midnight are compared as
//! absolute intervals.
//!
//! By default an event spilling past midnight is only compared on its start
//! date: one-time events starting on different dates never conflict.
//! Enabling `cross_midnight` in [`ConflictPolicy`] lifts that restriction.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::occurrence::Occurrence;
use crate::time::TimeWindow;

const SAME_DAY: &[i64] = &[0];
const ADJACENT_DAYS: &[i64] = &[-1, 0, 1];

/// Options controlling how pairs of occurrences are compared.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictPolicy {
    /// Also compare each event against occurrences starting one day earlier
    /// or later, catching windows that spill over midnight.
    pub cross_midnight: bool,
}

impl ConflictPolicy {
    /// Policy with midnight spill-over detection enabled.
    #[must_use]
    pub fn cross_midnight() -> Self {
        Self {
            cross_midnight: true,
        }
    }

    /// Day offsets at which the existing occurrence is compared.
    fn day_offsets(&self) -> &'static [i64] {
        if self.cross_midnight {
            ADJACENT_DAYS
        } else {
            SAME_DAY
        }
    }
}

/// Returns `true` if two windows share at least one instant.
///
/// Uses half-open semantics, so back-to-back windows do not overlap.
pub fn time_overlap(a: &TimeWindow, b: &TimeWindow) -> bool {
    a.overlaps(b)
}

/// Decides whether candidate events collide with existing ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConflictChecker {
    policy: ConflictPolicy,
}

impl ConflictChecker {
    /// Creates a checker using the given policy.
    pub fn new(policy: ConflictPolicy) -> Self {
        Self { policy }
    }

    /// Returns the policy in use.
    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Returns the first existing occurrence that conflicts with `candidate`.
    ///
    /// Occurrences whose id equals `exclude_id` are skipped, so an update can
    /// be checked without matching the event's own stored row. Iteration
    /// stops at the first conflict.
    pub fn find_conflict<'a, I>(
        &self,
        candidate: &Occurrence,
        existing: I,
        exclude_id: Option<&str>,
    ) -> Option<&'a Occurrence>
    where
        I: IntoIterator<Item = &'a Occurrence>,
    {
        let found = existing
            .into_iter()
            .filter(|event| exclude_id != Some(event.id.as_str()))
            .find(|event| self.conflicts_with(candidate, event));

        if let Some(event) = found {
            debug!(
                candidate = %candidate.id,
                existing = %event.id,
                "Candidate conflicts with existing event"
            );
        }
        found
    }

    /// Returns `true` if `candidate` conflicts with any existing occurrence.
    pub fn has_conflict<'a, I>(
        &self,
        candidate: &Occurrence,
        existing: I,
        exclude_id: Option<&str>,
    ) -> bool
    where
        I: IntoIterator<Item = &'a Occurrence>,
    {
        self.find_conflict(candidate, existing, exclude_id).is_some()
    }

    /// Returns `true` if the two occurrences overlap under this policy.
    pub fn conflicts_with(&self, candidate: &Occurrence, existing: &Occurrence) -> bool {
        let conflict = self
            .policy
            .day_offsets()
            .iter()
            .any(|&offset| conflicts_at_offset(candidate, existing, offset));
        trace!(
            candidate = %candidate.id,
            existing = %existing.id,
            conflict,
            "Compared occurrences"
        );
        conflict
    }
}

/// Returns `true` if `candidate` conflicts with any of `existing`, using the
/// default policy.
pub fn has_conflict<'a, I>(candidate: &Occurrence, existing: I, exclude_id: Option<&str>) -> bool
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    ConflictChecker::default().has_conflict(candidate, existing, exclude_id)
}

/// Returns the first existing occurrence conflicting with `candidate`, using
/// the default policy.
pub fn find_conflict<'a, I>(
    candidate: &Occurrence,
    existing: I,
    exclude_id: Option<&str>,
) -> Option<&'a Occurrence>
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    ConflictChecker::default().find_conflict(candidate, existing, exclude_id)
}

/// Compares an occurrence of `a` on some date `day` with an occurrence of `b`
/// on `day + offset`.
fn conflicts_at_offset(a: &Occurrence, b: &Occurrence, offset: i64) -> bool {
    let day = match (a.is_recurring, b.is_recurring) {
        (true, true) => {
            // Any shared weekday will do; both windows are projected from
            // a's anchor date.
            if !a.recurring_days.intersects(b.recurring_days.rotate(-offset)) {
                return false;
            }
            a.date()
        }
        (true, false) => match shift(b.date(), -offset) {
            Some(day) if a.occurs_on(day) => day,
            _ => return false,
        },
        (false, _) => a.date(),
    };
    let Some(other_day) = shift(day, offset) else {
        return false;
    };
    if !a.is_recurring && !b.occurs_on(other_day) {
        return false;
    }

    time_overlap(&a.window_on(day), &b.window_on(other_day))
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}
