//! Week-row splitting of multi-day occurrences.
//!
//! An occurrence is clipped to the visible month and cut at every Saturday,
//! so each [`WeekSegment`] lies within one Sunday..Saturday grid row.

use chrono::{Datelike, Duration};
use serde::{Deserialize, Serialize};

use crate::event::Occurrence;
use crate::time::VisibleMonth;

/// Weekday index of Saturday, counted from Sunday.
const SATURDAY: u32 = 6;

/// The part of an occurrence that falls within one grid row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSegment {
    /// Index of the owning occurrence in the layout.
    pub occurrence: usize,
    /// First day of month covered.
    pub start_day: u32,
    /// Number of days covered, at least 1.
    pub length_days: u32,
    /// The occurrence started before the visible month.
    pub continues_before: bool,
    /// The occurrence ends after the visible month.
    pub continues_after: bool,
}

impl WeekSegment {
    /// Returns the last day of month covered.
    pub fn end_day(&self) -> u32 {
        self.start_day + self.length_days - 1
    }

    /// Iterates over the days of month covered.
    pub fn days(&self) -> impl Iterator<Item = u32> {
        self.start_day..=self.end_day()
    }
}

/// Splits `occurrence` into week segments for `month`.
///
/// An end exactly at midnight is exclusive: the occurrence ends the previous
/// day. Occurrences that do not touch the month yield no segment.
pub fn build_segments(
    occurrence: &Occurrence,
    index: usize,
    month: &VisibleMonth,
) -> Vec<WeekSegment> {
    let start_date = occurrence.start.date();
    let mut end_date = occurrence.end.date();
    if occurrence.end.is_midnight() {
        end_date -= Duration::days(1);
    }
    let end_date = end_date.max(start_date);

    let days_in_month = month.days_in_month();
    let first = month.first_day();
    let last = first + Duration::days(i64::from(days_in_month) - 1);
    if end_date < first || start_date > last {
        return Vec::new();
    }

    let continues_before = start_date < first;
    let continues_after = end_date > last;
    let start_day = if continues_before { 1 } else { start_date.day() };
    let last_day = if continues_after {
        days_in_month
    } else {
        end_date.day()
    };

    let mut segments = Vec::new();
    let mut segment_start = start_day;
    let mut before = continues_before;

    for day in start_day..=last_day {
        if day == last_day {
            segments.push(WeekSegment {
                occurrence: index,
                start_day: segment_start,
                length_days: day - segment_start + 1,
                continues_before: before,
                continues_after,
            });
            break;
        }
        if (month.first_weekday() + day - 1) % 7 == SATURDAY {
            segments.push(WeekSegment {
                occurrence: index,
                start_day: segment_start,
                length_days: day - segment_start + 1,
                continues_before: before,
                continues_after: false,
            });
            segment_start = day + 1;
            before = false;
        }
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::Moment;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> Moment {
        Moment::from_date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> Moment {
        Moment::from_wall(
            NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        )
    }

    fn occurrence(start: Moment, end: Moment) -> Occurrence {
        Occurrence {
            title: "Trip".into(),
            start,
            end,
            description: None,
            location: None,
            all_day: start.is_midnight(),
        }
    }

    fn march() -> VisibleMonth {
        VisibleMonth::new(2024, 3).unwrap()
    }

    fn seg(start_day: u32, length_days: u32, before: bool, after: bool) -> WeekSegment {
        WeekSegment {
            occurrence: 0,
            start_day,
            length_days,
            continues_before: before,
            continues_after: after,
        }
    }

    mod splitting {
        use super::*;

        #[test]
        fn friday_to_tuesday_splits_at_saturday() {
            // All-day Mar 8 (Fri) through Mar 12 (Tue); Mar 9 is a Saturday.
            let occ = occurrence(day(2024, 3, 8), day(2024, 3, 13));
            let segments = build_segments(&occ, 0, &march());
            assert_eq!(segments, vec![seg(8, 2, false, false), seg(10, 3, false, false)]);
        }

        #[test]
        fn within_one_week() {
            let occ = occurrence(at(2024, 3, 12, 9), at(2024, 3, 14, 17));
            assert_eq!(build_segments(&occ, 3, &march()), vec![WeekSegment {
                occurrence: 3,
                ..seg(12, 3, false, false)
            }]);
        }

        #[test]
        fn ending_on_saturday_is_one_segment() {
            let occ = occurrence(day(2024, 3, 14), day(2024, 3, 17));
            assert_eq!(build_segments(&occ, 0, &march()), vec![seg(14, 3, false, false)]);
        }

        #[test]
        fn three_rows() {
            let occ = occurrence(day(2024, 3, 7), day(2024, 3, 20));
            assert_eq!(
                build_segments(&occ, 0, &march()),
                vec![seg(7, 3, false, false), seg(10, 7, false, false), seg(17, 3, false, false)]
            );
        }

        #[test]
        fn non_midnight_end_counts_its_day() {
            let occ = occurrence(at(2024, 3, 10, 16), at(2024, 3, 11, 12));
            assert_eq!(build_segments(&occ, 0, &march()), vec![seg(10, 2, false, false)]);
        }
    }

    mod clipping {
        use super::*;

        #[test]
        fn starts_before_month() {
            // March 1 2024 is a Friday, so day 2 closes the first row.
            let occ = occurrence(day(2024, 2, 28), day(2024, 3, 5));
            assert_eq!(
                build_segments(&occ, 0, &march()),
                vec![seg(1, 2, true, false), seg(3, 2, false, false)]
            );
        }

        #[test]
        fn ends_after_month() {
            let occ = occurrence(day(2024, 3, 29), day(2024, 4, 3));
            assert_eq!(
                build_segments(&occ, 0, &march()),
                vec![seg(29, 2, false, false), seg(31, 1, false, true)]
            );
        }

        #[test]
        fn ends_exactly_at_next_month_midnight() {
            let occ = occurrence(day(2024, 3, 31), day(2024, 4, 1));
            assert_eq!(build_segments(&occ, 0, &march()), vec![seg(31, 1, false, false)]);
        }

        #[test]
        fn outside_month_is_empty() {
            let before = occurrence(day(2024, 2, 20), day(2024, 3, 1));
            let after = occurrence(day(2024, 4, 1), day(2024, 4, 3));
            assert!(build_segments(&before, 0, &march()).is_empty());
            assert!(build_segments(&after, 0, &march()).is_empty());
        }

        #[test]
        fn zero_length_all_day_keeps_its_day() {
            let occ = occurrence(day(2024, 3, 20), day(2024, 3, 20));
            assert_eq!(build_segments(&occ, 0, &march()), vec![seg(20, 1, false, false)]);
        }
    }

    #[test]
    fn segment_helpers() {
        let a = seg(5, 3, false, false);
        assert_eq!(a.end_day(), 7);
        assert_eq!(a.days().collect::<Vec<_>>(), vec![5, 6, 7]);
    }
}
