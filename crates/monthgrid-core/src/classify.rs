//! Raw feed to canonical event classification.
//!
//! The classifier runs once per data refresh. It partitions the flat feed
//! into canonical events (bucketed by [`EventKind`]) and exception records,
//! then attaches each exception to the recurring event it belongs to.
//!
//! Feed order is preserved inside each bucket; the lane allocator depends on
//! it.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::diagnostics::{Diagnostics, ExceptionKind, Warning};
use crate::event::{CancelledOccurrence, CanonicalEvent, ChangedOccurrence, EventKind};
use crate::record::{RawEventRecord, RawEventTime, RecordStatus};
use crate::recurrence::strip_rule_prefix;
use crate::time::{Moment, TimezoneMode};

/// The classified content of one provider query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Events stacked in lanes, in feed order.
    pub multi_day: Vec<CanonicalEvent>,
    /// Events listed in their day cell, in feed order.
    pub single_day: Vec<CanonicalEvent>,
    /// Records dropped during classification.
    pub diagnostics: Diagnostics,
}

impl Snapshot {
    /// The snapshot used when no data could be fetched.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the number of canonical events.
    pub fn len(&self) -> usize {
        self.multi_day.len() + self.single_day.len()
    }

    /// Returns true if the snapshot holds no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn events_mut(&mut self) -> impl Iterator<Item = &mut CanonicalEvent> {
        self.multi_day.iter_mut().chain(self.single_day.iter_mut())
    }
}

/// Turns raw provider records into a [`Snapshot`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EventClassifier {
    mode: TimezoneMode,
}

enum Classified {
    Event(Box<CanonicalEvent>),
    Cancelled(CancelledOccurrence),
    Changed(Box<ChangedOccurrence>),
}

impl EventClassifier {
    /// Creates a classifier interpreting times with `mode`.
    pub fn new(mode: TimezoneMode) -> Self {
        Self { mode }
    }

    /// Classifies a whole feed.
    pub fn classify(&self, records: &[RawEventRecord]) -> Snapshot {
        let mut snapshot = Snapshot::empty();
        let mut cancelled = Vec::new();
        let mut changed = Vec::new();

        for record in records {
            match self.classify_record(record) {
                Ok(Classified::Event(event)) => match event.kind {
                    EventKind::MultiDay => snapshot.multi_day.push(*event),
                    EventKind::SingleDay => snapshot.single_day.push(*event),
                },
                Ok(Classified::Cancelled(c)) => cancelled.push(c),
                Ok(Classified::Changed(c)) => changed.push(*c),
                Err(reason) => snapshot.diagnostics.push(Warning::UnrecognizedRecord {
                    id: record.id.clone(),
                    reason,
                }),
            }
        }

        attach_exceptions(&mut snapshot, cancelled, changed);

        debug!(
            multi_day = snapshot.multi_day.len(),
            single_day = snapshot.single_day.len(),
            warnings = snapshot.diagnostics.len(),
            "classified feed of {} records",
            records.len()
        );
        snapshot
    }

    fn classify_record(&self, record: &RawEventRecord) -> Result<Classified, String> {
        let status = record
            .status
            .as_ref()
            .ok_or_else(|| "missing status".to_string())?;

        if let Some(original) = record.original_start {
            let parent = record
                .recurring_event_id
                .clone()
                .ok_or_else(|| "exception without recurring event id".to_string())?;
            let original_start = self.mode.interpret(&original);

            return match status {
                RecordStatus::Cancelled => Ok(Classified::Cancelled(CancelledOccurrence {
                    recurring_event_id: parent,
                    original_start,
                })),
                RecordStatus::Confirmed => {
                    let (new_start, new_end) = self.span(record)?;
                    Ok(Classified::Changed(Box::new(ChangedOccurrence {
                        recurring_event_id: parent,
                        original_start,
                        new_start,
                        new_end,
                        title: record.effective_title().to_string(),
                        description: record.description.clone(),
                        location: record.location.clone(),
                    })))
                }
                RecordStatus::Other(s) => Err(format!("exception with status {}", s)),
            };
        }

        match status {
            RecordStatus::Confirmed => {
                let (start, end) = self.span(record)?;
                let mut event = CanonicalEvent::new(&record.id, record.effective_title(), start, end)
                    .with_all_day(record.start.is_some_and(|t| t.is_all_day()))
                    .with_description(record.description.clone())
                    .with_location(record.location.clone());

                let anchor = match record.start {
                    Some(RawEventTime::DateTime(dt)) => Some(*dt.offset()),
                    _ => None,
                };
                let (rule, exdates) = split_recurrence(&record.recurrence, anchor);
                if let Some(rule) = rule {
                    event = event.with_rule(rule);
                }
                for exdate in &exdates {
                    event.add_cancelled(&self.excluded_start(exdate, anchor));
                }
                Ok(Classified::Event(Box::new(event)))
            }
            other => Err(format!("status {}", other.as_str())),
        }
    }

    fn span(&self, record: &RawEventRecord) -> Result<(Moment, Moment), String> {
        match (&record.start, &record.end) {
            (Some(start), Some(end)) => Ok((self.mode.interpret(start), self.mode.interpret(end))),
            _ => Err("missing start or end".to_string()),
        }
    }

    /// Interprets an `EXDATE` value as the wall-clock start it removes.
    ///
    /// With the calendar's own zone, UTC values are moved to the offset the
    /// event start was declared with, so they land on the instance's day.
    fn excluded_start(&self, raw: &RawEventTime, anchor: Option<FixedOffset>) -> Moment {
        match (self.mode, raw, anchor) {
            (TimezoneMode::Calendar, RawEventTime::DateTime(dt), Some(offset)) => {
                Moment::from_wall(dt.with_timezone(&offset).naive_local())
            }
            _ => self.mode.interpret(raw),
        }
    }
}

/// Attaches exceptions to recurring events by parent id.
///
/// Exceptions whose parent is absent or not recurring are dropped and
/// reported.
fn attach_exceptions(
    snapshot: &mut Snapshot,
    cancelled: Vec<CancelledOccurrence>,
    changed: Vec<ChangedOccurrence>,
) {
    let mut cancelled_matched = vec![false; cancelled.len()];
    let mut changed_matched = vec![false; changed.len()];

    for event in snapshot.events_mut() {
        if !event.is_recurring() {
            continue;
        }
        for (i, change) in changed.iter().enumerate() {
            if change.recurring_event_id == event.id {
                event.add_changed(change.clone());
                changed_matched[i] = true;
            }
        }
        for (i, cancel) in cancelled.iter().enumerate() {
            if cancel.recurring_event_id == event.id {
                event.add_cancelled(&cancel.original_start);
                cancelled_matched[i] = true;
            }
        }
    }

    for (change, matched) in changed.into_iter().zip(changed_matched) {
        if !matched {
            snapshot.diagnostics.push(Warning::UnmatchedException {
                recurring_event_id: change.recurring_event_id,
                original_date: change.original_start.date(),
                exception: ExceptionKind::Changed,
            });
        }
    }
    for (cancel, matched) in cancelled.into_iter().zip(cancelled_matched) {
        if !matched {
            snapshot.diagnostics.push(Warning::UnmatchedException {
                recurring_event_id: cancel.recurring_event_id,
                original_date: cancel.original_start.date(),
                exception: ExceptionKind::Cancelled,
            });
        }
    }
}

/// Splits recurrence lines into the rule and any `EXDATE` values.
///
/// The first rule line is used; later rule lines are ignored. Floating
/// `EXDATE` times are read in `anchor`, the offset of the event start.
fn split_recurrence(
    lines: &[String],
    anchor: Option<FixedOffset>,
) -> (Option<String>, Vec<RawEventTime>) {
    let mut rule = None;
    let mut exdates = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.to_ascii_uppercase().starts_with("EXDATE") {
            exdates.extend(parse_exdate_line(line, anchor));
        } else if rule.is_none() {
            rule = Some(strip_rule_prefix(line).to_string());
        }
    }
    (rule, exdates)
}

/// Parses the values of an `EXDATE[;params]:v1,v2` line.
///
/// Values are `YYYYMMDD`, `YYYYMMDDTHHMMSSZ`, or a floating
/// `YYYYMMDDTHHMMSS` placed in the line's `TZID` when it names a known zone.
fn parse_exdate_line(line: &str, anchor: Option<FixedOffset>) -> Vec<RawEventTime> {
    let Some((head, values)) = line.split_once(':') else {
        return Vec::new();
    };
    let zone = head
        .split(';')
        .skip(1)
        .find_map(|param| param.strip_prefix("TZID="))
        .and_then(|name| match name.parse::<Tz>() {
            Ok(tz) => Some(tz),
            Err(_) => {
                debug!("ignoring unknown EXDATE zone {}", name);
                None
            }
        });

    values
        .split(',')
        .filter_map(|value| parse_exdate_value(value.trim(), zone, anchor))
        .collect()
}

fn parse_exdate_value(
    value: &str,
    zone: Option<Tz>,
    anchor: Option<FixedOffset>,
) -> Option<RawEventTime> {
    if value.len() == 8 {
        return NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .map(RawEventTime::Date);
    }

    let (local, utc) = match value.strip_suffix('Z') {
        Some(local) => (local, true),
        None => (value, false),
    };
    let naive = NaiveDateTime::parse_from_str(local, "%Y%m%dT%H%M%S").ok()?;
    let dt = if utc {
        Utc.from_utc_datetime(&naive).fixed_offset()
    } else if let Some(tz) = zone {
        tz.from_local_datetime(&naive).earliest()?.fixed_offset()
    } else {
        let offset = match anchor {
            Some(offset) => offset,
            None => FixedOffset::east_opt(0)?,
        };
        offset.from_local_datetime(&naive).single()?
    };
    Some(RawEventTime::DateTime(dt))
}
