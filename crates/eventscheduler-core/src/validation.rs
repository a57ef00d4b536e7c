//! Validation of incoming event payloads.
//!
//! Payloads arrive as an [`EventDraft`] (create) or an [`EventPatch`]
//! (update). Both are turned into a [`ValidatedEvent`], which is guaranteed to
//! satisfy every precondition the conflict checker assumes:
//! - duration within `1..=1440` minutes
//! - every recurring day within `0..=6`
//! - at least one day for recurring events

use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::occurrence::{Occurrence, Weekdays};

/// Maximum length of an event name, in characters.
pub const MAX_NAME_LENGTH: usize = 100;

/// Maximum event duration (one day), in minutes.
pub const MAX_DURATION_MINUTES: i64 = 1440;

/// Names must start with a letter, digit, whitespace, hyphen or underscore.
static NAME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\s\-_]").expect("Invalid name regex"));

/// Reasons an event payload is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Name is empty or only whitespace.
    #[error("name cannot be empty or just whitespace")]
    BlankName,

    /// Name exceeds [`MAX_NAME_LENGTH`].
    #[error("name is too long: {length} characters (max: {max})")]
    NameTooLong { length: usize, max: usize },

    /// Name starts with a disallowed character.
    #[error("name must start with a letter, digit, space, hyphen or underscore: {name:?}")]
    InvalidName { name: String },

    /// Start time lies before the current time.
    #[error("start time cannot be in the past: {start_time}")]
    StartInPast { start_time: DateTime<FixedOffset> },

    /// Duration outside `1..=1440` minutes.
    #[error("duration must be between 1 and {max} minutes, got {duration}")]
    DurationOutOfRange { duration: i64, max: i64 },

    /// Recurring event without any day selected.
    #[error("recurring events must have at least one day selected")]
    MissingRecurringDays,

    /// Day index outside `0..=6`.
    #[error("days must be between 0 and 6, got {day}")]
    DayOutOfRange { day: i64 },
}

/// A create payload, as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    /// Event name.
    pub name: String,
    /// Event start.
    pub start_time: DateTime<FixedOffset>,
    /// Duration in minutes.
    pub duration: i64,
    /// Whether the event repeats weekly.
    #[serde(default)]
    pub is_recurring: bool,
    /// Day indices (0 = Monday) the event repeats on.
    #[serde(default)]
    pub recurring_days: Vec<i64>,
}

impl EventDraft {
    /// Creates a one-time draft.
    pub fn new(name: impl Into<String>, start_time: DateTime<FixedOffset>, duration: i64) -> Self {
        Self {
            name: name.into(),
            start_time,
            duration,
            is_recurring: false,
            recurring_days: Vec::new(),
        }
    }

    /// Builder: make the draft recur on the given day indices.
    #[must_use]
    pub fn recurring_on(mut self, days: impl IntoIterator<Item = i64>) -> Self {
        self.is_recurring = true;
        self.recurring_days = days.into_iter().collect();
        self
    }

    /// Validates the draft for creation at `now`.
    ///
    /// # Errors
    ///
    /// Returns the first rule the draft breaks.
    pub fn validate(self, now: DateTime<Utc>) -> Result<ValidatedEvent, ValidationError> {
        let name = validate_name(&self.name)?;
        ensure_not_past(self.start_time, now)?;
        let recurring_days = validate_days(self.is_recurring, &self.recurring_days)?;
        Ok(ValidatedEvent {
            name,
            start_time: self.start_time,
            duration_minutes: validate_duration(self.duration)?,
            is_recurring: self.is_recurring,
            recurring_days,
        })
    }
}

/// An update payload: only the fields present are changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New start time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<FixedOffset>>,
    /// New duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// New recurring flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
    /// New recurring day indices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_days: Option<Vec<i64>>,
}

impl EventPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set the start time.
    #[must_use]
    pub fn start_time(mut self, start_time: DateTime<FixedOffset>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Builder: set the duration.
    #[must_use]
    pub fn duration(mut self, minutes: i64) -> Self {
        self.duration = Some(minutes);
        self
    }

    /// Builder: set the recurring flag.
    #[must_use]
    pub fn recurring(mut self, is_recurring: bool) -> Self {
        self.is_recurring = Some(is_recurring);
        self
    }

    /// Builder: set the recurring days.
    #[must_use]
    pub fn recurring_days(mut self, days: impl IntoIterator<Item = i64>) -> Self {
        self.recurring_days = Some(days.into_iter().collect());
        self
    }

    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_time.is_none()
            && self.duration.is_none()
            && self.is_recurring.is_none()
            && self.recurring_days.is_none()
    }

    /// Applies the patch on top of `current`, validating the result at `now`.
    ///
    /// The name and past-start rules only apply to fields the patch sets; an
    /// event whose stored start has since passed can still be renamed. The
    /// duration and day rules apply to the merged event.
    ///
    /// # Errors
    ///
    /// Returns the first rule the merged event breaks.
    pub fn apply(
        self,
        current: &ValidatedEvent,
        now: DateTime<Utc>,
    ) -> Result<ValidatedEvent, ValidationError> {
        let name = match self.name {
            Some(name) => validate_name(&name)?,
            None => current.name.clone(),
        };
        let start_time = match self.start_time {
            Some(start_time) => {
                ensure_not_past(start_time, now)?;
                start_time
            }
            None => current.start_time,
        };
        let duration = self.duration.unwrap_or(i64::from(current.duration_minutes));
        let is_recurring = self.is_recurring.unwrap_or(current.is_recurring);
        let recurring_days = match self.recurring_days {
            Some(days) => validate_days(is_recurring, &days)?,
            None => {
                if is_recurring && current.recurring_days.is_empty() {
                    return Err(ValidationError::MissingRecurringDays);
                }
                current.recurring_days
            }
        };

        Ok(ValidatedEvent {
            name,
            start_time,
            duration_minutes: validate_duration(duration)?,
            is_recurring,
            recurring_days,
        })
    }
}

/// An event payload that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedEvent {
    /// Trimmed event name.
    pub name: String,
    /// Event start.
    pub start_time: DateTime<FixedOffset>,
    /// Duration in minutes, within `1..=1440`.
    pub duration_minutes: u32,
    /// Whether the event repeats weekly.
    pub is_recurring: bool,
    /// Days the event repeats on; non-empty when `is_recurring`.
    pub recurring_days: Weekdays,
}

impl ValidatedEvent {
    /// Builds the occurrence descriptor the conflict checker consumes.
    pub fn occurrence(&self, id: impl Into<String>) -> Occurrence {
        Occurrence {
            id: id.into(),
            start_time: self.start_time,
            duration_minutes: i64::from(self.duration_minutes),
            is_recurring: self.is_recurring,
            recurring_days: self.recurring_days,
        }
    }
}

fn validate_name(raw: &str) -> Result<String, ValidationError> {
    let length = raw.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            length,
            max: MAX_NAME_LENGTH,
        });
    }
    if raw.is_empty() {
        return Err(ValidationError::BlankName);
    }
    if !NAME_REGEX.is_match(raw) {
        return Err(ValidationError::InvalidName {
            name: raw.to_string(),
        });
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(trimmed.to_string())
}

fn ensure_not_past(
    start_time: DateTime<FixedOffset>,
    now: DateTime<Utc>,
) -> Result<(), ValidationError> {
    if start_time < now {
        return Err(ValidationError::StartInPast { start_time });
    }
    Ok(())
}

fn validate_duration(duration: i64) -> Result<u32, ValidationError> {
    match u32::try_from(duration) {
        Ok(minutes) if (1..=MAX_DURATION_MINUTES).contains(&duration) => Ok(minutes),
        _ => Err(ValidationError::DurationOutOfRange {
            duration,
            max: MAX_DURATION_MINUTES,
        }),
    }
}

fn validate_days(is_recurring: bool, days: &[i64]) -> Result<Weekdays, ValidationError> {
    if is_recurring && days.is_empty() {
        return Err(ValidationError::MissingRecurringDays);
    }
    if let Some(&day) = days.iter().find(|day| !(0..=6).contains(*day)) {
        return Err(ValidationError::DayOutOfRange { day });
    }
    Ok(Weekdays::from_indices(days.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Weekday};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn standup() -> EventDraft {
        EventDraft::new("Team standup", at(2024, 6, 3, 9, 0), 15)
    }

    mod draft {
        use super::*;

        #[test]
        fn valid_one_time() {
            let event = standup().validate(now()).unwrap();
            assert_eq!(event.name, "Team standup");
            assert_eq!(event.duration_minutes, 15);
            assert!(!event.is_recurring);
            assert!(event.recurring_days.is_empty());
        }

        #[test]
        fn valid_recurring() {
            let event = standup().recurring_on([0, 2, 4]).validate(now()).unwrap();
            assert!(event.is_recurring);
            assert_eq!(event.recurring_days.indices(), vec![0, 2, 4]);
            assert!(event.recurring_days.contains(Weekday::Fri));
        }

        #[test]
        fn name_is_trimmed() {
            let mut draft = standup();
            draft.name = "  Retro  ".to_string();
            assert_eq!(draft.validate(now()).unwrap().name, "Retro");
        }

        #[test]
        fn blank_names_rejected() {
            for name in ["", "   ", "\t"] {
                let mut draft = standup();
                draft.name = name.to_string();
                assert_eq!(draft.validate(now()), Err(ValidationError::BlankName));
            }
        }

        #[test]
        fn long_name_rejected() {
            let mut draft = standup();
            draft.name = "a".repeat(MAX_NAME_LENGTH + 1);
            assert_eq!(
                draft.validate(now()),
                Err(ValidationError::NameTooLong {
                    length: 101,
                    max: 100
                })
            );

            let mut draft = standup();
            draft.name = "a".repeat(MAX_NAME_LENGTH);
            assert!(draft.validate(now()).is_ok());
        }

        #[test]
        fn name_must_start_with_allowed_character() {
            let mut draft = standup();
            draft.name = "!urgent".to_string();
            assert!(matches!(
                draft.validate(now()),
                Err(ValidationError::InvalidName { .. })
            ));

            let mut draft = standup();
            draft.name = "Sync (weekly)".to_string();
            assert!(draft.validate(now()).is_ok());
        }

        #[test]
        fn past_start_rejected() {
            let draft = EventDraft::new("Late", at(2024, 6, 1, 11, 59), 30);
            assert!(matches!(
                draft.validate(now()),
                Err(ValidationError::StartInPast { .. })
            ));

            let draft = EventDraft::new("Right now", at(2024, 6, 1, 12, 0), 30);
            assert!(draft.validate(now()).is_ok());
        }

        #[test]
        fn duration_bounds() {
            for (duration, ok) in [(0, false), (-5, false), (1, true), (1440, true), (1441, false)]
            {
                let mut draft = standup();
                draft.duration = duration;
                assert_eq!(draft.validate(now()).is_ok(), ok, "duration {duration}");
            }
        }

        #[test]
        fn recurring_without_days_rejected() {
            let draft = standup().recurring_on([]);
            assert_eq!(
                draft.validate(now()),
                Err(ValidationError::MissingRecurringDays)
            );
        }

        #[test]
        fn day_range_checked_even_when_not_recurring() {
            let mut draft = standup();
            draft.recurring_days = vec![1, 7];
            assert_eq!(
                draft.validate(now()),
                Err(ValidationError::DayOutOfRange { day: 7 })
            );

            let draft = standup().recurring_on([-1]);
            assert_eq!(
                draft.validate(now()),
                Err(ValidationError::DayOutOfRange { day: -1 })
            );
        }

        #[test]
        fn occurrence_carries_timing() {
            let event = standup().recurring_on([0]).validate(now()).unwrap();
            let occ = event.occurrence("evt-1");
            assert_eq!(occ.id, "evt-1");
            assert_eq!(occ.start_time, at(2024, 6, 3, 9, 0));
            assert_eq!(occ.duration_minutes, 15);
            assert!(occ.is_recurring);
            assert_eq!(occ.recurring_days, event.recurring_days);
        }

        #[test]
        fn deserializes_with_defaults() {
            let json = r#"{"name":"Demo","start_time":"2024-06-03T09:00:00+02:00","duration":30}"#;
            let draft: EventDraft = serde_json::from_str(json).unwrap();
            assert!(!draft.is_recurring);
            assert!(draft.recurring_days.is_empty());
            assert_eq!(draft.start_time.offset().local_minus_utc(), 7200);
        }
    }

    mod patch {
        use super::*;

        fn stored() -> ValidatedEvent {
            standup().recurring_on([0]).validate(now()).unwrap()
        }

        #[test]
        fn empty_patch_keeps_everything() {
            let patch = EventPatch::new();
            assert!(patch.is_empty());
            assert_eq!(patch.apply(&stored(), now()).unwrap(), stored());
        }

        #[test]
        fn only_provided_fields_change() {
            let updated = EventPatch::new()
                .name("Daily sync ")
                .duration(20)
                .apply(&stored(), now())
                .unwrap();
            assert_eq!(updated.name, "Daily sync");
            assert_eq!(updated.duration_minutes, 20);
            assert_eq!(updated.start_time, stored().start_time);
            assert_eq!(updated.recurring_days, stored().recurring_days);
        }

        #[test]
        fn stale_stored_start_is_not_rechecked() {
            let later = now() + Duration::days(30);
            let updated = EventPatch::new().name("Renamed").apply(&stored(), later);
            assert!(updated.is_ok());
        }

        #[test]
        fn new_start_must_not_be_past() {
            let result = EventPatch::new()
                .start_time(at(2024, 5, 31, 9, 0))
                .apply(&stored(), now());
            assert!(matches!(result, Err(ValidationError::StartInPast { .. })));
        }

        #[test]
        fn merged_duration_is_checked() {
            let result = EventPatch::new().duration(2000).apply(&stored(), now());
            assert_eq!(
                result,
                Err(ValidationError::DurationOutOfRange {
                    duration: 2000,
                    max: 1440
                })
            );
        }

        #[test]
        fn turning_on_recurrence_needs_days() {
            let one_time = standup().validate(now()).unwrap();
            let result = EventPatch::new().recurring(true).apply(&one_time, now());
            assert_eq!(result, Err(ValidationError::MissingRecurringDays));

            let updated = EventPatch::new()
                .recurring(true)
                .recurring_days([1, 3])
                .apply(&one_time, now())
                .unwrap();
            assert!(updated.is_recurring);
            assert_eq!(updated.recurring_days.indices(), vec![1, 3]);
        }

        #[test]
        fn clearing_days_of_recurring_event_rejected() {
            let result = EventPatch::new()
                .recurring_days(Vec::new())
                .apply(&stored(), now());
            assert_eq!(result, Err(ValidationError::MissingRecurringDays));
        }

        #[test]
        fn serializes_only_present_fields() {
            let patch = EventPatch::new().duration(45);
            let json = serde_json::to_string(&patch).unwrap();
            assert_eq!(json, r#"{"duration":45}"#);
        }
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ValidationError::MissingRecurringDays.to_string(),
            "recurring events must have at least one day selected"
        );
        assert_eq!(
            ValidationError::DayOutOfRange { day: 9 }.to_string(),
            "days must be between 0 and 6, got 9"
        );
        assert_eq!(
            ValidationError::DurationOutOfRange {
                duration: 0,
                max: 1440
            }
            .to_string(),
            "duration must be between 1 and 1440 minutes, got 0"
        );
    }
}
