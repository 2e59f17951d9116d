//! Time range filters over entry timestamps.
//!
//! A filter expression is `start[:stop]`. Each part is empty, relative
//! (`<n><unit>`, meaning "n units before now") or an absolute date.
//!
//! | unit | meaning           |
//! |------|-------------------|
//! | `M`  | minutes           |
//! | `h`  | hours             |
//! | `d`  | days              |
//! | `w`  | weeks             |
//! | `m`  | months (31 days)  |
//! | `y`  | years (365 days)  |
//!
//! Absolute parts are `-` separated, from most to least precise:
//! `YYYY-MM-DD-HH-MM-SS`, `YYYY-MM-DD-HH-MM`, `YYYY-MM-DD-HH`, `YYYY-MM-DD`,
//! `YYYY-MM` and `YYYY`. Missing fields default to the start of the period.

use crate::constants::{DAYS_PER_MONTH, DAYS_PER_YEAR};
use crate::errors::TimeFilterError;
use chrono::{Duration, Local, NaiveDate, NaiveDateTime};
use std::fmt;
use std::sync::Arc;

/// A source of the current instant.
///
/// Relative time expressions and open-ended filters are resolved against a
/// clock so tests can freeze time.
pub trait Clock: Send + Sync {
    /// The current local time.
    fn now(&self) -> NaiveDateTime;
}

/// The wall clock, in local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A closed interval over entry timestamps.
#[derive(Clone)]
pub struct TimeFilter {
    start: NaiveDateTime,
    stop: Option<NaiveDateTime>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for TimeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeFilter")
            .field("start", &self.start)
            .field("stop", &self.stop)
            .finish()
    }
}

impl TimeFilter {
    /// Parses a `start[:stop]` expression.
    ///
    /// An empty start means the distant past and an empty stop the distant
    /// future. When no stop part is given at all, the stop is "now" at the
    /// moment each entry is tested, so the filter tracks the present.
    ///
    /// # Errors
    ///
    /// Returns a `TimeFilterError` if the expression has more than two parts,
    /// a part cannot be understood, or the start lies after the stop.
    ///
    /// # Examples
    ///
    /// ```
    /// use j::journal_core::time_filter::{FixedClock, TimeFilter};
    /// use chrono::{Duration, NaiveDate};
    /// use std::sync::Arc;
    ///
    /// let now = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_hms_opt(12, 0, 0).unwrap();
    /// let filter = TimeFilter::from_arg("2y:1y", Arc::new(FixedClock(now))).unwrap();
    /// assert_eq!(filter.start(), now - Duration::days(2 * 365));
    /// assert_eq!(filter.stop(), Some(now - Duration::days(365)));
    /// ```
    pub fn from_arg(arg: &str, clock: Arc<dyn Clock>) -> Result<Self, TimeFilterError> {
        let parts: Vec<&str> = arg.split(':').map(str::trim).collect();
        if parts.len() > 2 {
            return Err(TimeFilterError::TooManyParts(arg.to_string()));
        }

        let now = clock.now();
        let start = match parts[0] {
            "" => NaiveDateTime::MIN,
            part => resolve_part(part, now)?,
        };
        let stop = match parts.get(1) {
            None => None,
            Some(&"") => Some(NaiveDateTime::MAX),
            Some(part) => Some(resolve_part(part, now)?),
        };

        if stop.is_some_and(|stop| start > stop) {
            return Err(TimeFilterError::StartAfterStop);
        }

        Ok(TimeFilter { start, stop, clock })
    }

    /// The earliest matching instant.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// The latest matching instant, or `None` when it is "now".
    pub fn stop(&self) -> Option<NaiveDateTime> {
        self.stop
    }

    /// Tests whether a timestamp falls inside the interval, ends included.
    pub fn matches(&self, timestamp: NaiveDateTime) -> bool {
        let stop = self.stop.unwrap_or_else(|| self.clock.now());
        self.start <= timestamp && timestamp <= stop
    }
}

fn resolve_part(part: &str, now: NaiveDateTime) -> Result<NaiveDateTime, TimeFilterError> {
    resolve_relative(part, now)
        .or_else(|| resolve_absolute(part))
        .ok_or_else(|| TimeFilterError::BadPart(part.to_string()))
}

fn resolve_relative(part: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let unit = part.chars().last()?;
    let digits = &part[..part.len() - unit.len_utf8()];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i64 = digits.parse().ok()?;

    let span = match unit {
        'M' => Duration::try_minutes(n),
        'h' => Duration::try_hours(n),
        'd' => Duration::try_days(n),
        'w' => Duration::try_weeks(n),
        'm' => n.checked_mul(DAYS_PER_MONTH).and_then(Duration::try_days),
        'y' => n.checked_mul(DAYS_PER_YEAR).and_then(Duration::try_days),
        _ => None,
    }?;

    now.checked_sub_signed(span)
}

fn resolve_absolute(part: &str) -> Option<NaiveDateTime> {
    let fields: Vec<&str> = part.split('-').collect();
    if fields.len() > 6 {
        return None;
    }

    let (year, rest) = fields.split_first()?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut values = [1u32, 1, 0, 0, 0];
    for (slot, field) in values.iter_mut().zip(rest) {
        if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = field.parse().ok()?;
    }
    let [month, day, hour, minute, second] = values;

    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day)?.and_hms_opt(hour, minute, second)
}
