//! First-fit lane allocation for week segments.
//!
//! [`LaneAllocator`] is a fold over segments in processing order. Its only
//! state is a per-day row table, owned by one allocation pass:
//! - a closed row holds a segment and may not be reused on that day
//! - a placeholder row only keeps alignment and may be taken later
//!
//! Two segments sharing a day never receive the same lane.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::span::WeekSegment;

/// What a placement stands for in its day cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementRole {
    /// First day of a segment.
    OccurrenceStart,
    /// A later day of a segment.
    Continuation,
    /// An empty row keeping lanes aligned across days.
    Placeholder,
}

/// One instruction for the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// Day of month.
    pub day: u32,
    /// Row index in the day cell.
    pub lane: usize,
    pub role: PlacementRole,
    /// Index of the segment, absent for placeholders.
    pub segment: Option<usize>,
}

impl Placement {
    /// Returns true for start and continuation placements.
    pub fn is_occupied(&self) -> bool {
        !matches!(self.role, PlacementRole::Placeholder)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowState {
    Placeholder,
    Closed,
}

/// Result of allocating a whole month of segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneAssignment {
    /// Placements in emission order.
    pub placements: Vec<Placement>,
    /// Chosen lane per segment, indexed like the input.
    pub lanes: Vec<usize>,
}

/// Greedy interval colouring of week segments.
#[derive(Debug, Default)]
pub struct LaneAllocator {
    rows: BTreeMap<u32, Vec<RowState>>,
    placements: Vec<Placement>,
    lanes: Vec<usize>,
}

impl LaneAllocator {
    /// Creates an allocator with an empty row table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates every segment in order.
    pub fn allocate(segments: &[WeekSegment]) -> LaneAssignment {
        let mut allocator = Self::new();
        for segment in segments {
            allocator.place(segment);
        }
        allocator.finish()
    }

    /// Places the next segment and returns its lane.
    pub fn place(&mut self, segment: &WeekSegment) -> usize {
        let index = self.lanes.len();
        let closed: BTreeSet<usize> = segment
            .days()
            .filter_map(|day| self.rows.get(&day))
            .flat_map(|rows| {
                rows.iter()
                    .enumerate()
                    .filter(|(_, state)| **state == RowState::Closed)
                    .map(|(lane, _)| lane)
            })
            .collect();
        let lane = (0..).find(|l| !closed.contains(l)).unwrap_or_default();

        for day in segment.days() {
            let rows = self.rows.entry(day).or_default();
            while rows.len() < lane {
                self.placements.push(Placement {
                    day,
                    lane: rows.len(),
                    role: PlacementRole::Placeholder,
                    segment: None,
                });
                rows.push(RowState::Placeholder);
            }
            if rows.len() == lane {
                rows.push(RowState::Closed);
            } else {
                rows[lane] = RowState::Closed;
            }

            let role = if day == segment.start_day {
                PlacementRole::OccurrenceStart
            } else {
                PlacementRole::Continuation
            };
            self.placements.push(Placement {
                day,
                lane,
                role,
                segment: Some(index),
            });
        }

        self.lanes.push(lane);
        lane
    }

    /// Consumes the allocator, discarding the row table.
    pub fn finish(self) -> LaneAssignment {
        LaneAssignment {
            placements: self.placements,
            lanes: self.lanes,
        }
    }
}
