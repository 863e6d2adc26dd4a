//! Calendar-day utilities: day differences, inclusive durations, work days,
//! and timezone-aware "today".
//!
//! Everything here works on whole calendar days (`NaiveDate`). Time of day
//! never leaks into the arithmetic.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{Error, Result};

/// Signed number of calendar days from `a` to `b` (`b - a`).
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (b - a).num_days()
}

/// Shift a date by a signed number of days, saturating at the ends of the
/// representable calendar.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    let saturated = if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX };
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(saturated)
}

/// Inclusive calendar day count between two dates.
///
/// Not guarded: an inverted range yields zero or a negative count, so bad
/// data entry shows up in the output instead of being clamped away.
pub fn duration_days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    days_between(start, end) + 1
}

/// Inclusive day count excluding Saturdays and Sundays. No holiday calendar.
///
/// An inverted range contains no days and yields 0.
pub fn work_days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return 0;
    }
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !is_weekend(*d))
        .count() as i64
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A single reading of the clock: the instant, and the calendar date it
/// falls on for the user. Passed explicitly so results stay reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Now {
    pub utc: DateTime<Utc>,
    pub today: NaiveDate,
}

impl Now {
    pub fn new(utc: DateTime<Utc>, tz: &str) -> Result<Self> {
        Ok(Self { utc, today: today_in_timezone(utc, tz)? })
    }

    /// Midnight UTC of `today`.
    pub fn on(today: NaiveDate) -> Self {
        Self { utc: today.and_time(NaiveTime::MIN).and_utc(), today }
    }
}

/// Resolve the local calendar date of `now` in an IANA timezone like
/// "America/Chicago".
pub fn today_in_timezone(now: DateTime<Utc>, tz: &str) -> Result<NaiveDate> {
    let tz: Tz = tz
        .parse()
        .map_err(|_| Error::InvalidTimezone(tz.to_string()))?;
    Ok(now.with_timezone(&tz).date_naive())
}
