//! Date windows and named presets for the board's visible range.

use chrono::{DateTime, Datelike, Duration, FixedOffset, TimeZone, Utc};

use crate::error::{Error, Result};

/// The active date window. End bound is inclusive: presets resolve it to the
/// last representable millisecond of the day, matching the backend's
/// end-of-day-inclusive query semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Create a range, rejecting `start > end`.
    ///
    /// With typed instants the only invalid input left is ordering; unparseable
    /// bounds are caught upstream at decode time.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::Validation(format!(
                "date range start {} is after end {}",
                start.to_rfc3339(),
                end.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Whether an instant falls inside the window, end inclusive.
    pub fn contains(&self, time: DateTime<FixedOffset>) -> bool {
        let t = time.with_timezone(&Utc);
        self.start <= t && t <= self.end
    }
}

/// Named window presets, each resolved against an explicit `now` so the
/// resolution is pure and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRangePreset {
    /// First of this month through the end of today
    CurrentMonth,
    /// All of the previous calendar month
    PastMonth,
    /// Monday of this week through the end of today
    CurrentWeek,
    /// Monday through Sunday of the previous week
    PastWeek,
    /// 28 days ago (start of day) through the end of today; the initial default
    Last4Weeks,
}

impl DateRangePreset {
    /// Resolve the preset into a concrete range relative to `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateRange {
        let (start, end) = match self {
            DateRangePreset::CurrentMonth => (start_of_month(now), end_of_day(now)),
            DateRangePreset::PastMonth => {
                let last_of_previous = start_of_month(now) - Duration::days(1);
                (start_of_month(last_of_previous), end_of_day(last_of_previous))
            }
            DateRangePreset::CurrentWeek => (start_of_week(now), end_of_day(now)),
            DateRangePreset::PastWeek => {
                let this_week = start_of_week(now);
                (this_week - Duration::days(7), end_of_day(this_week - Duration::days(1)))
            }
            DateRangePreset::Last4Weeks => {
                (start_of_day(now - Duration::days(28)), end_of_day(now))
            }
        };
        // Preset bounds are ordered by construction
        DateRange { start, end }
    }
}

/// Holds exactly one active date range at a time.
///
/// Changing the range does not itself trigger any network activity; callers
/// re-run the bulk load for the new window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRangeSelector {
    range: DateRange,
}

impl DateRangeSelector {
    /// New selector with the default window: last 4 weeks relative to `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            range: DateRangePreset::Last4Weeks.resolve(now),
        }
    }

    pub fn range(&self) -> DateRange {
        self.range
    }

    /// Replace both bounds atomically. On a rejected range neither bound
    /// changes.
    pub fn set_range(&mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
        self.range = DateRange::new(start, end)?;
        Ok(())
    }

    /// Replace both bounds from a preset, resolved against `now`.
    pub fn apply_preset(&mut self, preset: DateRangePreset, now: DateTime<Utc>) {
        self.range = preset.resolve(now);
    }
}

fn start_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|n| Utc.from_utc_datetime(&n))
        .unwrap_or(dt)
}

fn end_of_day(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.date_naive()
        .and_hms_milli_opt(23, 59, 59, 999)
        .map(|n| Utc.from_utc_datetime(&n))
        .unwrap_or(dt)
}

fn start_of_week(dt: DateTime<Utc>) -> DateTime<Utc> {
    let days_into_week = dt.weekday().num_days_from_monday() as i64;
    start_of_day(dt - Duration::days(days_into_week))
}

fn start_of_month(dt: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(dt - Duration::days((dt.day() - 1) as i64))
}
