//! Canonical event types.
//!
//! This module provides the types the classifier produces and the resolver
//! consumes:
//! - [`CanonicalEvent`]: a template event, possibly recurring, with its
//!   exceptions attached
//! - [`CancelledOccurrence`] / [`ChangedOccurrence`]: per-instance exceptions
//! - [`Occurrence`]: one concrete instance, after expansion and substitution

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::time::Moment;

/// Whether an event is stacked in lanes or listed in its day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SingleDay,
    MultiDay,
}

impl EventKind {
    /// Classifies a template span.
    ///
    /// An event is multi-day when it lasts at least 24 hours, or when it ends
    /// on a later calendar day at or after noon.
    pub fn classify(start: &Moment, end: &Moment) -> Self {
        let long = end.duration_since(start) >= Duration::hours(24);
        let past_noon_next_day = !start.same_day(end) && end.hour() >= 12;
        if long || past_noon_next_day {
            Self::MultiDay
        } else {
            Self::SingleDay
        }
    }
}

/// One removed instance of a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelledOccurrence {
    pub recurring_event_id: String,
    pub original_start: Moment,
}

/// One replaced instance of a recurring event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedOccurrence {
    pub recurring_event_id: String,
    pub original_start: Moment,
    pub new_start: Moment,
    pub new_end: Moment,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl ChangedOccurrence {
    /// Builds the substituted occurrence.
    pub fn to_occurrence(&self, all_day: bool) -> Occurrence {
        Occurrence {
            title: self.title.clone(),
            start: self.new_start,
            end: self.new_end,
            description: self.description.clone(),
            location: self.location.clone(),
            all_day,
        }
    }
}

/// A classified event from one data snapshot.
///
/// `kind` is computed once from the template span and never re-evaluated
/// per occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub id: String,
    pub title: String,
    pub start: Moment,
    pub end: Moment,
    pub all_day: bool,
    pub description: Option<String>,
    pub location: Option<String>,
    pub kind: EventKind,
    /// The recurrence rule, without any `RRULE:` prefix.
    pub recurrence_rule: Option<String>,
    /// Days on which an instance was removed.
    pub cancelled_occurrences: BTreeSet<NaiveDate>,
    /// Replacements keyed by the day of the original instance.
    pub changed_occurrences: BTreeMap<NaiveDate, ChangedOccurrence>,
}

impl CanonicalEvent {
    /// Creates an event and classifies it from `start`/`end`.
    pub fn new(id: impl Into<String>, title: impl Into<String>, start: Moment, end: Moment) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            start,
            end,
            all_day: false,
            description: None,
            location: None,
            kind: EventKind::classify(&start, &end),
            recurrence_rule: None,
            cancelled_occurrences: BTreeSet::new(),
            changed_occurrences: BTreeMap::new(),
        }
    }

    /// Returns true if the event carries a recurrence rule.
    pub fn is_recurring(&self) -> bool {
        self.recurrence_rule.is_some()
    }

    /// Returns the template duration, never negative.
    pub fn duration(&self) -> Duration {
        self.end.duration_since(&self.start).max(Duration::zero())
    }

    /// Returns the event itself as a single occurrence.
    pub fn as_occurrence(&self) -> Occurrence {
        self.occurrence_at(self.start)
    }

    /// Returns the template moved to `start`, keeping its duration.
    pub fn occurrence_at(&self, start: Moment) -> Occurrence {
        Occurrence {
            title: self.title.clone(),
            start,
            end: start.add(self.duration()),
            description: self.description.clone(),
            location: self.location.clone(),
            all_day: self.all_day,
        }
    }

    /// Returns true if the instance on `date` was cancelled.
    pub fn is_cancelled_on(&self, date: NaiveDate) -> bool {
        self.cancelled_occurrences.contains(&date)
    }

    /// Returns the replacement for the instance on `date`, if any.
    pub fn change_on(&self, date: NaiveDate) -> Option<&ChangedOccurrence> {
        self.changed_occurrences.get(&date)
    }

    /// Records a cancelled instance.
    pub fn add_cancelled(&mut self, original_start: &Moment) {
        self.cancelled_occurrences.insert(original_start.date());
    }

    /// Records a changed instance. The first change for a day wins.
    pub fn add_changed(&mut self, change: ChangedOccurrence) {
        self.changed_occurrences
            .entry(change.original_start.date())
            .or_insert(change);
    }

    /// Builder method to mark the event as all-day.
    pub fn with_all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    /// Builder method to set the recurrence rule.
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.recurrence_rule = Some(rule.into());
        self
    }
}

/// One concrete calendar instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub title: String,
    pub start: Moment,
    pub end: Moment,
    pub description: Option<String>,
    pub location: Option<String>,
    pub all_day: bool,
}
