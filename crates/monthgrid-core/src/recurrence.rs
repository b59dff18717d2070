//! Recurrence expansion.
//!
//! Rules are expanded with the `rrule` crate, anchored at the template's
//! wall-clock start labelled as UTC (see [`Moment::to_anchor`]). Generated
//! dates are filtered to the half-open window `[start, end)` here rather than
//! relying on the library's own boundary convention.

use chrono::{Duration, Utc};
use tracing::debug;

use crate::error::RuleError;
use crate::event::{CanonicalEvent, Occurrence};
use crate::time::{Moment, TimeWindow, VisibleMonth};

/// Default cap on generated dates per event and window.
pub const DEFAULT_MAX_INSTANCES: usize = 1000;

/// Removes a leading `RRULE:` property name, if present.
pub fn strip_rule_prefix(rule: &str) -> &str {
    let rule = rule.trim();
    match rule.get(..6) {
        Some(prefix) if prefix.eq_ignore_ascii_case("RRULE:") => &rule[6..],
        _ => rule,
    }
}

/// Normalizes a rule for expansion against a UTC anchor.
///
/// A date-only `UNTIL` covers its whole last day, and a floating `UNTIL`
/// date-time is read as UTC.
pub fn normalize_rule(rule: &str) -> String {
    strip_rule_prefix(rule)
        .split(';')
        .filter(|part| !part.is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, value)) if key.eq_ignore_ascii_case("UNTIL") => {
                if value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit()) {
                    format!("{}={}T235959Z", key, value)
                } else if !value.ends_with(['Z', 'z']) {
                    format!("{}={}Z", key, value)
                } else {
                    part.to_string()
                }
            }
            _ => part.to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

/// Rule-generated start moments for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Generated starts in ascending order.
    pub starts: Vec<Moment>,
    /// True if generation stopped at the instance cap.
    pub limited: bool,
}

/// The occurrences of one event for one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Occurrences in expansion order, exceptions applied.
    pub occurrences: Vec<Occurrence>,
    /// True if expansion stopped at the instance cap.
    pub limited: bool,
}

/// Expands recurring events into concrete occurrences.
#[derive(Debug, Clone, Copy)]
pub struct RecurrenceResolver {
    max_instances: usize,
}

impl Default for RecurrenceResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_INSTANCES)
    }
}

impl RecurrenceResolver {
    /// Creates a resolver generating at most `max_instances` dates per call.
    pub fn new(max_instances: usize) -> Self {
        Self {
            max_instances: max_instances.max(1),
        }
    }

    /// Returns the instance cap.
    pub fn max_instances(&self) -> usize {
        self.max_instances
    }

    /// Enumerates the starts `d` generated by `rule` with
    /// `window.start <= d < window.end`.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] if the rule cannot be parsed or validated.
    pub fn expand_starts(
        &self,
        rule: &str,
        anchor: Moment,
        window: &TimeWindow,
    ) -> Result<Expansion, RuleError> {
        let normalized = normalize_rule(rule);
        let text = format!(
            "DTSTART:{}\nRRULE:{}",
            anchor.to_anchor().format("%Y%m%dT%H%M%SZ"),
            normalized
        );
        let set = text
            .parse::<rrule::RRuleSet>()
            .map_err(|e| RuleError::parse(rule, e.to_string()))?;

        let tz = rrule::Tz::Tz(chrono_tz::UTC);
        let after = window.start.sub(Duration::seconds(1)).to_anchor();
        let before = window.end.to_anchor();
        let limit = u16::try_from(self.max_instances).unwrap_or(u16::MAX);

        let result = set
            .after(after.with_timezone(&tz))
            .before(before.with_timezone(&tz))
            .all(limit);

        let starts = result
            .dates
            .into_iter()
            .map(|dt| Moment::from_anchor(dt.with_timezone(&Utc)))
            .filter(|start| window.contains(start))
            .collect();

        Ok(Expansion {
            starts,
            limited: result.limited,
        })
    }

    /// Resolves `event` over `window`, applying its exceptions.
    ///
    /// A non-recurring event resolves to itself; callers decide whether it
    /// is visible.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] if the event's rule is invalid.
    pub fn resolve(
        &self,
        event: &CanonicalEvent,
        window: &TimeWindow,
    ) -> Result<Resolution, RuleError> {
        let Some(rule) = event.recurrence_rule.as_deref() else {
            return Ok(Resolution {
                occurrences: vec![event.as_occurrence()],
                limited: false,
            });
        };

        let expansion = self.expand_starts(rule, event.start, window)?;
        let generated = expansion.starts.len();
        let occurrences: Vec<Occurrence> = expansion
            .starts
            .into_iter()
            .filter_map(|start| {
                let day = start.date();
                if event.is_cancelled_on(day) {
                    return None;
                }
                Some(match event.change_on(day) {
                    Some(change) => change.to_occurrence(event.all_day),
                    None => event.occurrence_at(start),
                })
            })
            .collect();

        debug!(
            event_id = %event.id,
            generated,
            kept = occurrences.len(),
            "expanded recurrence between {} and {}",
            window.start,
            window.end
        );

        Ok(Resolution {
            occurrences,
            limited: expansion.limited,
        })
    }

    /// Resolves `event` for a month view.
    ///
    /// The window starts one event duration before the month so occurrences
    /// that begin earlier but still overlap it are generated.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::Parse`] if the event's rule is invalid.
    pub fn resolve_for_month(
        &self,
        event: &CanonicalEvent,
        month: &VisibleMonth,
    ) -> Result<Resolution, RuleError> {
        self.resolve(event, &TimeWindow::for_month(month, event.duration()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::ChangedOccurrence;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> Moment {
        Moment::from_date(date(y, m, d))
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Moment {
        Moment::from_wall(date(y, m, d).and_hms_opt(h, min, 0).unwrap())
    }

    fn march() -> VisibleMonth {
        VisibleMonth::new(2024, 3).unwrap()
    }

    fn weekly_mondays() -> CanonicalEvent {
        CanonicalEvent::new("mon", "Planning", day(2024, 1, 1), day(2024, 1, 2))
            .with_all_day(true)
            .with_rule("FREQ=WEEKLY;BYDAY=MO")
    }

    fn starts(resolution: &Resolution) -> Vec<NaiveDate> {
        resolution.occurrences.iter().map(|o| o.start.date()).collect()
    }

    mod normalization {
        use super::*;

        #[test]
        fn strips_prefix() {
            assert_eq!(strip_rule_prefix("RRULE:FREQ=DAILY"), "FREQ=DAILY");
            assert_eq!(strip_rule_prefix("rrule:FREQ=DAILY"), "FREQ=DAILY");
            assert_eq!(strip_rule_prefix(" FREQ=DAILY "), "FREQ=DAILY");
        }

        #[test]
        fn until_forms() {
            assert_eq!(
                normalize_rule("RRULE:FREQ=WEEKLY;UNTIL=20240331"),
                "FREQ=WEEKLY;UNTIL=20240331T235959Z"
            );
            assert_eq!(
                normalize_rule("FREQ=DAILY;UNTIL=20240331T100000"),
                "FREQ=DAILY;UNTIL=20240331T100000Z"
            );
            assert_eq!(
                normalize_rule("FREQ=DAILY;UNTIL=20240331T100000Z;INTERVAL=2"),
                "FREQ=DAILY;UNTIL=20240331T100000Z;INTERVAL=2"
            );
        }
    }

    mod window {
        use super::*;

        #[test]
        fn weekly_mondays_in_march() {
            let resolver = RecurrenceResolver::default();
            let window = TimeWindow::new(day(2024, 3, 1), day(2024, 4, 1));
            let resolution = resolver.resolve(&weekly_mondays(), &window).unwrap();

            assert_eq!(
                starts(&resolution),
                vec![date(2024, 3, 4), date(2024, 3, 11), date(2024, 3, 18), date(2024, 3, 25)]
            );
            assert!(!resolution.limited);
            assert!(resolution.occurrences.iter().all(|o| o.all_day));
        }

        #[test]
        fn start_inclusive_end_exclusive() {
            let resolver = RecurrenceResolver::default();
            let window = TimeWindow::new(at(2024, 3, 5, 9, 0), at(2024, 3, 8, 9, 0));
            let expansion = resolver
                .expand_starts("FREQ=DAILY", at(2024, 3, 1, 9, 0), &window)
                .unwrap();

            assert_eq!(
                expansion.starts,
                vec![at(2024, 3, 5, 9, 0), at(2024, 3, 6, 9, 0), at(2024, 3, 7, 9, 0)]
            );
        }

        #[test]
        fn month_window_reaches_back_by_duration() {
            // Thursdays lasting three days: Feb 29 runs into March.
            let event = CanonicalEvent::new("thu", "Retreat", day(2024, 2, 1), day(2024, 2, 4))
                .with_rule("RRULE:FREQ=WEEKLY");
            let resolution = RecurrenceResolver::default()
                .resolve_for_month(&event, &march())
                .unwrap();

            assert_eq!(
                starts(&resolution),
                vec![
                    date(2024, 2, 29),
                    date(2024, 3, 7),
                    date(2024, 3, 14),
                    date(2024, 3, 21),
                    date(2024, 3, 28)
                ]
            );
            assert_eq!(resolution.occurrences[0].end, day(2024, 3, 3));
        }

        #[test]
        fn keeps_template_wall_clock_time() {
            let event = CanonicalEvent::new(
                "late",
                "Late call",
                at(2024, 3, 1, 23, 30),
                at(2024, 3, 2, 0, 30),
            )
            .with_rule("FREQ=WEEKLY;COUNT=3");
            let resolution = RecurrenceResolver::default()
                .resolve_for_month(&event, &march())
                .unwrap();

            let got: Vec<_> = resolution.occurrences.iter().map(|o| (o.start, o.end)).collect();
            assert_eq!(
                got,
                vec![
                    (at(2024, 3, 1, 23, 30), at(2024, 3, 2, 0, 30)),
                    (at(2024, 3, 8, 23, 30), at(2024, 3, 9, 0, 30)),
                    (at(2024, 3, 15, 23, 30), at(2024, 3, 16, 0, 30)),
                ]
            );
        }

        #[test]
        fn date_only_until_covers_last_day() {
            let event = CanonicalEvent::new("d", "Sprint", day(2024, 3, 25), day(2024, 3, 26))
                .with_rule("FREQ=DAILY;UNTIL=20240327");
            let resolution = RecurrenceResolver::default()
                .resolve_for_month(&event, &march())
                .unwrap();
            assert_eq!(
                starts(&resolution),
                vec![date(2024, 3, 25), date(2024, 3, 26), date(2024, 3, 27)]
            );
        }
    }

    mod exceptions {
        use super::*;

        #[test]
        fn cancelled_and_changed_by_day() {
            let mut event = weekly_mondays();
            event.add_cancelled(&day(2024, 3, 11));
            event.add_changed(ChangedOccurrence {
                recurring_event_id: "mon".into(),
                original_start: at(2024, 3, 18, 15, 30),
                new_start: day(2024, 3, 19),
                new_end: day(2024, 3, 21),
                title: "Planning (moved)".into(),
                description: Some("two days".into()),
                location: Some("Room 2".into()),
            });

            let resolution = RecurrenceResolver::default()
                .resolve_for_month(&event, &march())
                .unwrap();

            assert_eq!(
                starts(&resolution),
                vec![date(2024, 3, 4), date(2024, 3, 19), date(2024, 3, 25)]
            );
            let moved = &resolution.occurrences[1];
            assert_eq!(moved.title, "Planning (moved)");
            assert_eq!(moved.end, day(2024, 3, 21));
            assert_eq!(moved.location.as_deref(), Some("Room 2"));
            assert_eq!(resolution.occurrences[2].title, "Planning");
        }
    }

    mod failures {
        use super::*;

        #[test]
        fn unparsable_rule() {
            let event = weekly_mondays().with_rule("FREQ=SOMETIMES");
            let err = RecurrenceResolver::default()
                .resolve_for_month(&event, &march())
                .unwrap_err();
            assert_eq!(err.rule(), "FREQ=SOMETIMES");
        }

        #[test]
        fn instance_cap() {
            let event = CanonicalEvent::new("daily", "Daily", day(2024, 3, 1), day(2024, 3, 2))
                .with_rule("FREQ=DAILY");
            let resolver = RecurrenceResolver::new(5);
            let resolution = resolver.resolve_for_month(&event, &march()).unwrap();

            assert_eq!(resolution.occurrences.len(), 5);
            assert!(resolution.limited);
            assert_eq!(resolver.max_instances(), 5);
        }
    }

    #[test]
    fn non_recurring_resolves_to_itself() {
        let event = CanonicalEvent::new("one", "Once", day(2024, 3, 8), day(2024, 3, 10));
        let resolution = RecurrenceResolver::default()
            .resolve_for_month(&event, &march())
            .unwrap();
        assert_eq!(resolution.occurrences, vec![event.as_occurrence()]);
    }
}
