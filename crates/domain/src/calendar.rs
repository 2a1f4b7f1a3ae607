// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Time-zone-anchored calendar arithmetic.
//!
//! Every period boundary in this system is a *local wall-clock day boundary*
//! in the target IANA zone, expressed as a UTC instant. That keeps day-level
//! ledger comparisons timezone-correct regardless of DST transitions.
//!
//! ## Invariants
//!
//! - Period starts are always local midnight in the target zone
//! - Stepping a period start by N units lands on local midnight again,
//!   even when the step crosses a DST transition
//! - Local times that do not exist (spring-forward gaps) resolve to the
//!   first existing instant after the gap; ambiguous local times
//!   (fall-back overlaps) resolve to the earlier offset
//! - Month and year arithmetic rolls over correctly (month 13 is next
//!   year's January)

use crate::error::DomainError;
use crate::types::Cadence;
use chrono::{
    DateTime, Datelike, Days, LocalResult, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Timelike, Utc,
};
use chrono_tz::Tz;

/// Upper bound on one-hour probes when resolving a local time that falls
/// into a DST gap. No real zone gap exceeds a few hours.
const GAP_PROBE_LIMIT: u32 = 5;

const SECONDS_PER_DAY: i64 = 86_400;

/// Local calendar and clock fields of an instant in some zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalParts {
    /// Local calendar year.
    pub year: i32,
    /// Local calendar month (1-based).
    pub month: u32,
    /// Local calendar day (1-based).
    pub day: u32,
    /// Local hour of day.
    pub hour: u32,
    /// Local minute.
    pub minute: u32,
    /// Local second.
    pub second: u32,
}

/// Decomposes a UTC instant into local calendar/clock fields for `zone`.
#[must_use]
pub fn parts_tz(instant: DateTime<Utc>, zone: Tz) -> LocalParts {
    let local = instant.with_timezone(&zone);
    LocalParts {
        year: local.year(),
        month: local.month(),
        day: local.day(),
        hour: local.hour(),
        minute: local.minute(),
        second: local.second(),
    }
}

/// Finds the UTC instant whose local representation in `zone` equals the
/// given wall-clock fields.
///
/// Zone offsets are not a pure function of the naive fields: a local time
/// may not exist (spring-forward gap) or may exist twice (fall-back
/// overlap). Gaps resolve forward in one-hour probes, capped at
/// [`GAP_PROBE_LIMIT`]; overlaps take the earlier offset.
///
/// # Errors
///
/// Returns an error if the fields do not name a real calendar date or
/// time of day.
pub fn zoned_utc(
    zone: Tz,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Result<DateTime<Utc>, DomainError> {
    let date = NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DomainError::InvalidCalendarFields { year, month, day })?;
    let time = NaiveTime::from_hms_opt(hour, minute, second)
        .ok_or(DomainError::InvalidCalendarFields { year, month, day })?;
    Ok(resolve_local(zone, date.and_time(time)))
}

/// Resolves a naive local datetime to a UTC instant, handling DST gaps
/// and overlaps. Total: pathological zone data degrades to treating the
/// fields as UTC rather than failing.
fn resolve_local(zone: Tz, naive: NaiveDateTime) -> DateTime<Utc> {
    let mut probe = naive;
    for _ in 0..GAP_PROBE_LIMIT {
        match zone.from_local_datetime(&probe) {
            LocalResult::Single(resolved) => return resolved.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => return earliest.with_timezone(&Utc),
            LocalResult::None => probe += TimeDelta::hours(1),
        }
    }
    Utc.from_utc_datetime(&naive)
}

/// The UTC instant of local midnight on `date` in `zone`.
///
/// On days where midnight itself falls into a DST gap (some zones start
/// DST at 00:00), this is the first instant of the local day.
#[must_use]
pub fn local_midnight(zone: Tz, date: NaiveDate) -> DateTime<Utc> {
    resolve_local(zone, date.and_time(NaiveTime::MIN))
}

/// Calendar-day arithmetic, ignoring time of day and zone.
///
/// Month and year rollover are handled by the calendar itself: the day
/// after January 31st is February 1st, and the day after December 31st
/// is January 1st of the next year. Negative counts step backward.
/// Saturates at the supported calendar range instead of overflowing.
#[must_use]
pub fn add_local_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// Converts a calendar-day value into chrono's date representation.
///
/// Returns `None` only for dates outside chrono's supported range.
#[must_use]
pub fn naive_from_date(date: time::Date) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month() as u32, u32::from(date.day()))
}

/// Converts chrono's date representation into a calendar-day value.
///
/// Returns `None` only for dates outside the `time` crate's supported range.
#[must_use]
pub fn date_from_naive(naive: NaiveDate) -> Option<time::Date> {
    let month = u8::try_from(naive.month()).ok()?;
    let day = u8::try_from(naive.day()).ok()?;
    time::Date::from_calendar_date(naive.year(), time::Month::try_from(month).ok()?, day).ok()
}

/// The natural-aligned period start containing `instant`, as a UTC instant.
///
/// - weekly → Monday 00:00 local (ISO week start)
/// - monthly and quarterly → 1st of the local month, 00:00
/// - yearly → January 1st local, 00:00
///
/// Quarterly shares the monthly start; only its step size differs.
#[must_use]
pub fn period_start(cadence: Cadence, instant: DateTime<Utc>, zone: Tz) -> DateTime<Utc> {
    let local = instant.with_timezone(&zone).date_naive();
    let start = match cadence {
        Cadence::Weekly => add_local_days(
            local,
            -i64::from(local.weekday().num_days_from_monday()),
        ),
        Cadence::Monthly | Cadence::Quarterly => local.with_day(1).unwrap_or(local),
        Cadence::Yearly => NaiveDate::from_ymd_opt(local.year(), 1, 1).unwrap_or(local),
    };
    local_midnight(zone, start)
}

/// Advances a period start by `n` cadence units, re-anchored to local
/// midnight in `zone`.
///
/// - weekly → `n × 7` local days
/// - monthly → `n` calendar months (with year carry)
/// - quarterly → `3 × n` calendar months
/// - yearly → January 1st of `year + n`, never "same date n years later"
///
/// For `n >= 1` the result is strictly later than `start`, which is what
/// guarantees termination of the window-anchoring loop.
#[must_use]
pub fn step_periods(cadence: Cadence, start: DateTime<Utc>, n: u32, zone: Tz) -> DateTime<Utc> {
    let local = start.with_timezone(&zone).date_naive();
    let stepped = match cadence {
        Cadence::Weekly => add_local_days(local, 7 * i64::from(n)),
        Cadence::Monthly | Cadence::Quarterly => {
            let months = cadence.months_per_step().unwrap_or(1).saturating_mul(n);
            local
                .checked_add_months(Months::new(months))
                .unwrap_or(NaiveDate::MAX)
        }
        Cadence::Yearly => {
            let year = local.year().saturating_add(i32::try_from(n).unwrap_or(i32::MAX));
            NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MAX)
        }
    };
    local_midnight(zone, stepped)
}

/// Formats the local calendar date of `instant` in `zone` as `YYYY-MM-DD`.
#[must_use]
pub fn iso_date_tz(instant: DateTime<Utc>, zone: Tz) -> String {
    instant.with_timezone(&zone).format("%Y-%m-%d").to_string()
}

/// Whole calendar days between the local midnight of `now` and the local
/// midnight of `target`, rounding any partial day up.
///
/// Zero when the target is today or in the past-but-same-day; negative
/// values never round toward zero incorrectly (true ceiling).
#[must_use]
pub fn days_until(now: DateTime<Utc>, target: DateTime<Utc>, zone: Tz) -> i64 {
    let now_midnight = local_midnight(zone, now.with_timezone(&zone).date_naive());
    let target_midnight = local_midnight(zone, target.with_timezone(&zone).date_naive());
    let seconds = (target_midnight - now_midnight).num_seconds();
    seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0)
}

/// How close to its reset an unavailable item must be to count as
/// "coming up": 3 days for weekly cadence, 14 days for all others.
#[must_use]
pub const fn coming_up_threshold(cadence: Cadence) -> i64 {
    match cadence {
        Cadence::Weekly => 3,
        Cadence::Monthly | Cadence::Quarterly | Cadence::Yearly => 14,
    }
}
