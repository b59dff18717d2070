//! Collected, non-fatal warnings.
//!
//! Records the engine cannot use are dropped, but never silently: each drop
//! is pushed to a [`Diagnostics`] value the caller can inspect, and logged.

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

/// Which kind of exception record was left without a parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    Cancelled,
    Changed,
}

/// A single non-fatal problem found while building a layout.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A raw record matched no classification branch.
    #[error("unrecognized record {id}: {reason}")]
    UnrecognizedRecord { id: String, reason: String },

    /// A cancelled/changed record whose parent was not found among the
    /// recurring events of the snapshot.
    #[error("{exception:?} exception of {recurring_event_id} on {original_date} has no recurring parent")]
    UnmatchedException {
        recurring_event_id: String,
        original_date: NaiveDate,
        exception: ExceptionKind,
    },

    /// The event's recurrence rule could not be expanded; the event is skipped.
    #[error("event {event_id} skipped: {message}")]
    RecurrenceRule { event_id: String, message: String },

    /// Expansion stopped at the instance cap; later instances are missing.
    #[error("event {event_id}: expansion stopped after {limit} occurrences")]
    ExpansionLimited { event_id: String, limit: usize },
}

/// Warnings collected during one classification or layout pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records and logs a warning.
    pub fn push(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Returns the collected warnings in the order they were found.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Returns the number of warnings.
    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    /// Returns true if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Counts the unrecognized-record warnings.
    pub fn unrecognized_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::UnrecognizedRecord { .. }))
            .count()
    }

    /// Counts the unmatched-exception warnings.
    pub fn unmatched_count(&self) -> usize {
        self.warnings
            .iter()
            .filter(|w| matches!(w, Warning::UnmatchedException { .. }))
            .count()
    }
}
