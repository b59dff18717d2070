//! Time values for the layout engine.
//!
//! This module provides [`Moment`], an immutable wall-clock instant in the
//! interpretation zone, [`TimezoneMode`] which decides how provider date-times
//! become moments, [`TimeWindow`] for half-open resolution ranges and
//! [`VisibleMonth`] for the month grid metadata.
//!
//! Every calculation downstream of classification happens on wall-clock
//! values. Provider offsets are applied exactly once, in
//! [`TimezoneMode::interpret`], so recurrence anchoring and day arithmetic
//! never cross a DST or offset boundary.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike,
    Utc,
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::TimeError;
use crate::record::RawEventTime;

/// A wall-clock instant, free of any timezone.
///
/// Date-only values become midnight of that date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Moment(NaiveDateTime);

impl Moment {
    /// Creates a moment from a wall-clock date-time.
    pub fn from_wall(wall: NaiveDateTime) -> Self {
        Self(wall)
    }

    /// Creates a moment at midnight of the given date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN))
    }

    /// Rebuilds a moment from a rule anchor (see [`Moment::to_anchor`]).
    pub fn from_anchor(anchor: DateTime<Utc>) -> Self {
        Self(anchor.naive_utc())
    }

    /// Returns the wall-clock value labelled as UTC.
    ///
    /// Rule expansion runs on this neutral anchor so generated dates keep the
    /// template's wall-clock time whatever zone the viewer is in.
    pub fn to_anchor(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }

    /// Returns the underlying wall-clock value.
    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Returns the calendar date.
    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    /// Returns the hour of day (0-23).
    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    /// Returns true if the time of day is exactly 00:00:00.
    pub fn is_midnight(&self) -> bool {
        self.0.num_seconds_from_midnight() == 0 && self.0.nanosecond() == 0
    }

    /// Returns true if both moments fall on the same calendar day.
    pub fn same_day(&self, other: &Moment) -> bool {
        self.date() == other.date()
    }

    /// Returns this moment shifted forward by `duration`.
    pub fn add(&self, duration: Duration) -> Self {
        Self(self.0 + duration)
    }

    /// Returns this moment shifted backward by `duration`.
    pub fn sub(&self, duration: Duration) -> Self {
        Self(self.0 - duration)
    }

    /// Returns the signed duration from `earlier` to `self`.
    pub fn duration_since(&self, earlier: &Moment) -> Duration {
        self.0 - earlier.0
    }
}

impl fmt::Display for Moment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%S"))
    }
}

/// How provider date-times are turned into wall-clock moments.
///
/// This is the pass-through configuration flag: it picks the date/time calls
/// made during classification and nothing else. Date-only values are never
/// shifted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimezoneMode {
    /// Keep the offset the provider declared on each value.
    #[default]
    Calendar,
    /// Convert to the system local timezone.
    Local,
    /// Convert to a named IANA timezone.
    Named(Tz),
}

impl TimezoneMode {
    /// Builds the mode from the configuration surface.
    ///
    /// `viewer_timezone` is only consulted when the calendar timezone is not
    /// used; `None` means the system local zone.
    ///
    /// # Errors
    ///
    /// Returns [`TimeError::UnknownTimezone`] for an unknown IANA name.
    pub fn from_settings(
        use_calendar_timezone: bool,
        viewer_timezone: Option<&str>,
    ) -> Result<Self, TimeError> {
        if use_calendar_timezone {
            return Ok(Self::Calendar);
        }
        match viewer_timezone {
            Some(name) => name
                .parse::<Tz>()
                .map(Self::Named)
                .map_err(|_| TimeError::unknown_timezone(name)),
            None => Ok(Self::Local),
        }
    }

    /// Interprets a provider time as a wall-clock moment.
    pub fn interpret(&self, raw: &RawEventTime) -> Moment {
        match raw {
            RawEventTime::Date(date) => Moment::from_date(*date),
            RawEventTime::DateTime(dt) => match self {
                Self::Calendar => Moment::from_wall(dt.naive_local()),
                Self::Local => Moment::from_wall(dt.with_timezone(&Local).naive_local()),
                Self::Named(tz) => Moment::from_wall(dt.with_timezone(tz).naive_local()),
            },
        }
    }
}

/// A half-open resolution window `[start, end)` of wall-clock moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start of the window (inclusive).
    pub start: Moment,
    /// End of the window (exclusive).
    pub end: Moment,
}

impl TimeWindow {
    /// Creates a new time window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: Moment, end: Moment) -> Self {
        assert!(start <= end, "TimeWindow start must be <= end");
        Self { start, end }
    }

    /// Window used to resolve an event of the given duration for a month.
    ///
    /// The start is pulled back by the duration so occurrences that begin
    /// before the month but still overlap it are generated.
    pub fn for_month(month: &VisibleMonth, event_duration: Duration) -> Self {
        let lead = event_duration.max(Duration::zero());
        Self::new(month.start().sub(lead), month.end())
    }

    /// Checks if a moment falls within this window.
    pub fn contains(&self, moment: &Moment) -> bool {
        self.start <= *moment && *moment < self.end
    }
}

/// The month shown by the grid.
///
/// Grid rows run Sunday through Saturday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VisibleMonth {
    first: NaiveDate,
}

impl VisibleMonth {
    /// Creates the month for `year`/`month`, or `None` if out of range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first| Self { first })
    }

    /// Returns the month containing `date`.
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    /// Returns the calendar year.
    pub fn year(&self) -> i32 {
        self.first.year()
    }

    /// Returns the month number (1-12).
    pub fn month(&self) -> u32 {
        self.first.month()
    }

    /// Returns the first day of the month.
    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// Returns the date of `day` in this month, if it exists.
    pub fn date(&self, day: u32) -> Option<NaiveDate> {
        self.first.with_day(day)
    }

    /// Returns the number of days in the month.
    pub fn days_in_month(&self) -> u32 {
        let days = (self.next().first - self.first).num_days();
        u32::try_from(days).unwrap_or(31)
    }

    /// Returns the weekday of day 1, counted from Sunday = 0.
    pub fn first_weekday(&self) -> u32 {
        self.first.weekday().num_days_from_sunday()
    }

    /// Returns the empty cells before day 1 in the first grid row.
    pub fn leading_blank_days(&self) -> u32 {
        self.first_weekday()
    }

    /// Returns the empty cells after the last day in the last grid row.
    pub fn trailing_blank_days(&self) -> u32 {
        (7 - (self.leading_blank_days() + self.days_in_month()) % 7) % 7
    }

    /// Returns the number of grid rows.
    pub fn rows(&self) -> u32 {
        (self.leading_blank_days() + self.days_in_month() + self.trailing_blank_days()) / 7
    }

    /// Returns midnight of day 1.
    pub fn start(&self) -> Moment {
        Moment::from_date(self.first)
    }

    /// Returns midnight of day 1 of the following month.
    pub fn end(&self) -> Moment {
        self.next().start()
    }

    /// Returns true if `date` lies in this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Returns the following month.
    pub fn next(&self) -> Self {
        Self {
            first: self.first + Months::new(1),
        }
    }

    /// Returns the previous month.
    pub fn prev(&self) -> Self {
        Self {
            first: self.first - Months::new(1),
        }
    }
}

impl fmt::Display for VisibleMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.first.format("%Y-%m"))
    }
}

impl FromStr for VisibleMonth {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(|first| Self { first })
            .map_err(|_| TimeError::invalid_month(s))
    }
}

impl TryFrom<String> for VisibleMonth {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<VisibleMonth> for String {
    fn from(month: VisibleMonth) -> Self {
        month.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn wall(y: i32, m: u32, d: u32, h: u32, min: u32) -> Moment {
        Moment::from_wall(date(y, m, d).and_hms_opt(h, min, 0).unwrap())
    }

    mod moment {
        use super::*;

        #[test]
        fn date_is_midnight() {
            let m = Moment::from_date(date(2024, 3, 10));
            assert!(m.is_midnight());
            assert_eq!(m.hour(), 0);
            assert_eq!(m.date(), date(2024, 3, 10));
            assert!(!wall(2024, 3, 10, 0, 1).is_midnight());
        }

        #[test]
        fn same_day_ignores_time() {
            assert!(wall(2024, 3, 10, 0, 0).same_day(&wall(2024, 3, 10, 23, 59)));
            assert!(!wall(2024, 3, 10, 23, 59).same_day(&wall(2024, 3, 11, 0, 0)));
        }

        #[test]
        fn arithmetic() {
            let start = wall(2024, 3, 10, 9, 0);
            let end = start.add(Duration::hours(20));
            assert_eq!(end, wall(2024, 3, 11, 5, 0));
            assert_eq!(end.duration_since(&start), Duration::hours(20));
            assert_eq!(end.sub(Duration::hours(20)), start);
        }

        #[test]
        fn anchor_keeps_wall_clock() {
            let m = wall(2024, 3, 31, 1, 30);
            let anchor = m.to_anchor();
            assert_eq!(anchor, Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());
            assert_eq!(Moment::from_anchor(anchor), m);
        }

        #[test]
        fn display() {
            assert_eq!(wall(2024, 3, 1, 8, 5).to_string(), "2024-03-01T08:05:00");
        }

        #[test]
        fn serde_roundtrip() {
            let m = wall(2024, 3, 1, 8, 5);
            let json = serde_json::to_string(&m).unwrap();
            assert_eq!(json, "\"2024-03-01T08:05:00\"");
            let parsed: Moment = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, m);
        }
    }

    mod timezone_mode {
        use super::*;

        fn offset_time() -> RawEventTime {
            let tz = FixedOffset::west_opt(5 * 3600).unwrap();
            RawEventTime::DateTime(tz.with_ymd_and_hms(2024, 3, 10, 22, 0, 0).unwrap())
        }

        #[test]
        fn calendar_keeps_declared_offset() {
            let m = TimezoneMode::Calendar.interpret(&offset_time());
            assert_eq!(m, wall(2024, 3, 10, 22, 0));
        }

        #[test]
        fn named_zone_converts() {
            let mode = TimezoneMode::Named(chrono_tz::Europe::Paris);
            let m = mode.interpret(&offset_time());
            // 22:00 -05:00 is 03:00Z, 04:00 in Paris (CET).
            assert_eq!(m, wall(2024, 3, 11, 4, 0));
        }

        #[test]
        fn dates_never_shift() {
            let raw = RawEventTime::Date(date(2024, 3, 10));
            let mode = TimezoneMode::Named(chrono_tz::Pacific::Kiritimati);
            assert_eq!(mode.interpret(&raw), Moment::from_date(date(2024, 3, 10)));
        }

        #[test]
        fn from_settings() {
            assert_eq!(
                TimezoneMode::from_settings(true, Some("Europe/Paris")).unwrap(),
                TimezoneMode::Calendar
            );
            assert_eq!(
                TimezoneMode::from_settings(false, None).unwrap(),
                TimezoneMode::Local
            );
            assert_eq!(
                TimezoneMode::from_settings(false, Some("Europe/Paris")).unwrap(),
                TimezoneMode::Named(chrono_tz::Europe::Paris)
            );
            assert!(matches!(
                TimezoneMode::from_settings(false, Some("Nowhere/City")),
                Err(TimeError::UnknownTimezone { .. })
            ));
        }
    }

    mod time_window {
        use super::*;

        #[test]
        fn half_open() {
            let window = TimeWindow::new(wall(2024, 3, 1, 0, 0), wall(2024, 4, 1, 0, 0));
            assert!(window.contains(&wall(2024, 3, 1, 0, 0)));
            assert!(window.contains(&wall(2024, 3, 31, 23, 59)));
            assert!(!window.contains(&wall(2024, 4, 1, 0, 0)));
            assert!(!window.contains(&wall(2024, 2, 29, 23, 59)));
        }

        #[test]
        #[should_panic(expected = "start must be <= end")]
        fn invalid_window() {
            TimeWindow::new(wall(2024, 4, 1, 0, 0), wall(2024, 3, 1, 0, 0));
        }

        #[test]
        fn for_month_pulls_start_back() {
            let month = VisibleMonth::new(2024, 3).unwrap();
            let window = TimeWindow::for_month(&month, Duration::days(3));
            assert_eq!(window.start, wall(2024, 2, 27, 0, 0));
            assert_eq!(window.end, wall(2024, 4, 1, 0, 0));
        }
    }

    mod visible_month {
        use super::*;

        #[test]
        fn march_2024_metadata() {
            let month = VisibleMonth::new(2024, 3).unwrap();
            assert_eq!(month.days_in_month(), 31);
            // 2024-03-01 is a Friday.
            assert_eq!(month.first_weekday(), 5);
            assert_eq!(month.leading_blank_days(), 5);
            assert_eq!(month.trailing_blank_days(), 6);
            assert_eq!(month.rows(), 6);
        }

        #[test]
        fn february_leap_year() {
            let month = VisibleMonth::new(2024, 2).unwrap();
            assert_eq!(month.days_in_month(), 29);
            assert_eq!(month.first_weekday(), 4);
            assert_eq!(month.trailing_blank_days(), 2);
        }

        #[test]
        fn navigation_wraps_years() {
            let month = VisibleMonth::new(2024, 12).unwrap();
            assert_eq!(month.next(), VisibleMonth::new(2025, 1).unwrap());
            assert_eq!(month.next().prev(), month);
            assert_eq!(month.end(), Moment::from_date(date(2025, 1, 1)));
        }

        #[test]
        fn containing_and_contains() {
            let month = VisibleMonth::containing(date(2024, 3, 17));
            assert_eq!(month.first_day(), date(2024, 3, 1));
            assert!(month.contains(date(2024, 3, 31)));
            assert!(!month.contains(date(2025, 3, 1)));
            assert_eq!(month.date(31), Some(date(2024, 3, 31)));
            assert_eq!(VisibleMonth::new(2024, 4).unwrap().date(31), None);
        }

        #[test]
        fn parse_and_display() {
            let month: VisibleMonth = "2024-03".parse().unwrap();
            assert_eq!(month, VisibleMonth::new(2024, 3).unwrap());
            assert_eq!(month.to_string(), "2024-03");
            assert!("2024-13".parse::<VisibleMonth>().is_err());
            assert!("March".parse::<VisibleMonth>().is_err());
        }

        #[test]
        fn serde_as_string() {
            let month = VisibleMonth::new(2024, 3).unwrap();
            let json = serde_json::to_string(&month).unwrap();
            assert_eq!(json, "\"2024-03\"");
            let parsed: VisibleMonth = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, month);
        }
    }
}
