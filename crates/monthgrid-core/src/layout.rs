//! The month layout pipeline.
//!
//! [`MonthLayout::compute`] resolves every event of a [`Snapshot`] for one
//! visible month, splits multi-day occurrences into week segments, allocates
//! lanes and stacks single-day occurrences per day. Nothing is carried over
//! between calls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::Snapshot;
use crate::diagnostics::{Diagnostics, Warning};
use crate::event::{CanonicalEvent, Occurrence};
use crate::lanes::{LaneAllocator, Placement, PlacementRole};
use crate::recurrence::{DEFAULT_MAX_INSTANCES, RecurrenceResolver};
use crate::span::{WeekSegment, build_segments};
use crate::time::VisibleMonth;

/// Tuning knobs of a layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Cap on generated dates per recurring event.
    pub max_instances: usize,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

/// Grid metadata of the visible month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridMetrics {
    pub days_in_month: u32,
    /// Blank cells before day 1 (weekday of day 1, Sunday = 0).
    pub leading_blank_days: u32,
    /// Blank cells after the last day.
    pub trailing_blank_days: u32,
    pub rows: u32,
}

impl GridMetrics {
    fn for_month(month: &VisibleMonth) -> Self {
        Self {
            days_in_month: month.days_in_month(),
            leading_blank_days: month.leading_blank_days(),
            trailing_blank_days: month.trailing_blank_days(),
            rows: month.rows(),
        }
    }
}

/// One row of a day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DayRow {
    /// Kept empty for alignment.
    Placeholder,
    /// First day of a segment.
    Start { segment: usize },
    /// A later day of a segment.
    Continuation { segment: usize },
}

/// Everything shown in one day cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    /// Day of month.
    pub day: u32,
    /// Lane rows, indexed by lane.
    pub rows: Vec<DayRow>,
    /// Single-day occurrences stacked after the lanes.
    pub singles: Vec<Occurrence>,
}

impl DayCell {
    /// Returns true if nothing is drawn in this cell.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.singles.is_empty()
    }
}

/// A fully computed month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthLayout {
    pub month: VisibleMonth,
    pub grid: GridMetrics,
    /// Multi-day occurrences that touch the month, in processing order.
    pub occurrences: Vec<Occurrence>,
    /// Week segments, referencing `occurrences` by index.
    pub segments: Vec<WeekSegment>,
    /// Renderer instructions, referencing `segments` by index.
    pub placements: Vec<Placement>,
    /// One cell per day of month, day 1 first.
    pub days: Vec<DayCell>,
    pub diagnostics: Diagnostics,
}

impl MonthLayout {
    /// Computes the layout of `month` from scratch.
    pub fn compute(snapshot: &Snapshot, month: VisibleMonth, options: &LayoutOptions) -> Self {
        let resolver = RecurrenceResolver::new(options.max_instances);
        let mut diagnostics = snapshot.diagnostics.clone();

        let mut occurrences = Vec::new();
        let mut segments = Vec::new();
        for event in &snapshot.multi_day {
            for occurrence in resolve_event(&resolver, event, &month, &mut diagnostics) {
                let built = build_segments(&occurrence, occurrences.len(), &month);
                if built.is_empty() {
                    continue;
                }
                occurrences.push(occurrence);
                segments.extend(built);
            }
        }

        let assignment = LaneAllocator::allocate(&segments);

        let mut days: Vec<DayCell> = (1..=month.days_in_month())
            .map(|day| DayCell {
                day,
                rows: Vec::new(),
                singles: Vec::new(),
            })
            .collect();

        for placement in &assignment.placements {
            let Some(cell) = days.get_mut(placement.day as usize - 1) else {
                continue;
            };
            if cell.rows.len() <= placement.lane {
                cell.rows.resize(placement.lane + 1, DayRow::Placeholder);
            }
            if let Some(segment) = placement.segment {
                cell.rows[placement.lane] = match placement.role {
                    PlacementRole::OccurrenceStart => DayRow::Start { segment },
                    _ => DayRow::Continuation { segment },
                };
            }
        }

        for event in &snapshot.single_day {
            for occurrence in resolve_event(&resolver, event, &month, &mut diagnostics) {
                let date = occurrence.start.date();
                if !month.contains(date) {
                    continue;
                }
                let offset = (date - month.first_day()).num_days();
                if let Some(cell) = usize::try_from(offset).ok().and_then(|i| days.get_mut(i)) {
                    cell.singles.push(occurrence);
                }
            }
        }

        debug!(
            month = %month,
            occurrences = occurrences.len(),
            segments = segments.len(),
            placements = assignment.placements.len(),
            warnings = diagnostics.len(),
            "computed month layout"
        );

        Self {
            month,
            grid: GridMetrics::for_month(&month),
            occurrences,
            segments,
            placements: assignment.placements,
            days,
            diagnostics,
        }
    }

    /// The layout of a month with no data.
    pub fn empty(month: VisibleMonth) -> Self {
        Self::compute(&Snapshot::empty(), month, &LayoutOptions::default())
    }

    /// Returns the cell of `day`, if it exists.
    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.days.get(day.checked_sub(1)? as usize)
    }

    /// Returns the segment drawn by a placement.
    pub fn segment_of(&self, placement: &Placement) -> Option<&WeekSegment> {
        placement.segment.and_then(|i| self.segments.get(i))
    }

    /// Returns the occurrence a segment belongs to.
    pub fn occurrence_of(&self, segment: &WeekSegment) -> Option<&Occurrence> {
        self.occurrences.get(segment.occurrence)
    }

    /// Returns the largest number of lane rows in any day cell.
    pub fn max_lanes(&self) -> usize {
        self.days.iter().map(|d| d.rows.len()).max().unwrap_or(0)
    }
}

/// Resolves one event for `month`, reporting failures instead of propagating.
fn resolve_event(
    resolver: &RecurrenceResolver,
    event: &CanonicalEvent,
    month: &VisibleMonth,
    diagnostics: &mut Diagnostics,
) -> Vec<Occurrence> {
    match resolver.resolve_for_month(event, month) {
        Ok(resolution) => {
            if resolution.limited {
                diagnostics.push(Warning::ExpansionLimited {
                    event_id: event.id.clone(),
                    limit: resolver.max_instances(),
                });
            }
            resolution.occurrences
        }
        Err(err) => {
            diagnostics.push(Warning::RecurrenceRule {
                event_id: event.id.clone(),
                message: err.to_string(),
            });
            Vec::new()
        }
    }
}
