//! Raw records as delivered by a calendar provider.
//!
//! [`RawEventRecord`] is the provider-shaped input of the classifier. A feed
//! mixes three kinds of records: canonical events, cancelled instances of a
//! recurring event, and changed instances of a recurring event. The latter
//! two carry `recurring_event_id` and `original_start`.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::TimeError;

/// Fallback title for records without a summary.
pub const NO_TITLE: &str = "(No title)";

/// A provider time value.
///
/// Providers send either a date-only value (all-day events) or a date-time
/// with an explicit offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum RawEventTime {
    /// An all-day date.
    Date(NaiveDate),
    /// A date-time with the offset declared by the provider.
    DateTime(DateTime<FixedOffset>),
}

impl RawEventTime {
    /// Parses `YYYY-MM-DD` or an RFC3339 date-time.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::InvalidDateTime`] if the value is neither.
    pub fn parse(value: &str) -> Result<Self, TimeError> {
        let value = value.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Ok(Self::DateTime(dt));
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| TimeError::invalid_datetime(value))
    }

    /// Returns true if this is a date-only value.
    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }
}

/// Provider status of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Confirmed,
    Cancelled,
    /// Anything else the provider sends (e.g. `tentative`).
    Other(String),
}

impl RecordStatus {
    /// Maps a provider status string, case-insensitively.
    pub fn from_provider(status: &str) -> Self {
        if status.eq_ignore_ascii_case("confirmed") {
            Self::Confirmed
        } else if status.eq_ignore_ascii_case("cancelled") {
            Self::Cancelled
        } else {
            Self::Other(status.to_string())
        }
    }

    /// Returns the status as sent by the provider.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        }
    }
}

/// A raw calendar record from one provider query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEventRecord {
    /// Provider identifier of the record.
    pub id: String,
    /// Record status; `None` when the provider omitted it.
    pub status: Option<RecordStatus>,
    /// The event title.
    pub summary: Option<String>,
    /// The event description.
    pub description: Option<String>,
    /// The event location.
    pub location: Option<String>,
    /// When the event starts. Cancelled exception records usually omit it.
    pub start: Option<RawEventTime>,
    /// When the event ends.
    pub end: Option<RawEventTime>,
    /// Recurrence lines; the first one is the rule.
    #[serde(default)]
    pub recurrence: Vec<String>,
    /// Parent event id, present only on exception records.
    pub recurring_event_id: Option<String>,
    /// Start of the replaced instance, present only on exception records.
    pub original_start: Option<RawEventTime>,
}

impl RawEventRecord {
    /// Creates a record with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: None,
            summary: None,
            description: None,
            location: None,
            start: None,
            end: None,
            recurrence: Vec::new(),
            recurring_event_id: None,
            original_start: None,
        }
    }

    /// Creates a confirmed record spanning `start..end`.
    pub fn confirmed(id: impl Into<String>, start: RawEventTime, end: RawEventTime) -> Self {
        Self::new(id)
            .with_status(RecordStatus::Confirmed)
            .with_times(start, end)
    }

    /// Returns the title, falling back to [`NO_TITLE`] when empty.
    pub fn effective_title(&self) -> &str {
        self.summary
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(NO_TITLE)
    }

    /// Returns true if this record replaces or removes one instance.
    pub fn is_exception(&self) -> bool {
        self.original_start.is_some()
    }

    /// Builder method to set the status.
    pub fn with_status(mut self, status: RecordStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Builder method to set the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder method to set start and end.
    pub fn with_times(mut self, start: RawEventTime, end: RawEventTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Builder method to append a recurrence line.
    pub fn with_recurrence(mut self, line: impl Into<String>) -> Self {
        self.recurrence.push(line.into());
        self
    }

    /// Builder method to mark this record as an exception of `parent_id`.
    pub fn with_exception_of(
        mut self,
        parent_id: impl Into<String>,
        original_start: RawEventTime,
    ) -> Self {
        self.recurring_event_id = Some(parent_id.into());
        self.original_start = Some(original_start);
        self
    }
}
