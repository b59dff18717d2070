//! Core engine: time values, classification, recurrence, week spans, lane packing

pub mod classify;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod format;
pub mod lanes;
pub mod layout;
pub mod record;
pub mod recurrence;
pub mod span;
pub mod time;
pub mod tracing;

pub use classify::{EventClassifier, Snapshot};
pub use diagnostics::{Diagnostics, ExceptionKind, Warning};
pub use error::{RuleError, TimeError};
pub use event::{CancelledOccurrence, CanonicalEvent, ChangedOccurrence, EventKind, Occurrence};
pub use format::{OutputFormat, TextOptions, ellipsis, render_text};
pub use lanes::{LaneAllocator, LaneAssignment, Placement, PlacementRole};
pub use layout::{DayCell, DayRow, GridMetrics, LayoutOptions, MonthLayout};
pub use record::{NO_TITLE, RawEventRecord, RawEventTime, RecordStatus};
pub use recurrence::{DEFAULT_MAX_INSTANCES, RecurrenceResolver, Resolution, normalize_rule};
pub use span::{WeekSegment, build_segments};
pub use time::{Moment, TimeWindow, TimezoneMode, VisibleMonth};
pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
