//! Date utilities: the engine clock, parsing and the text formats used in the DB.

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Storage format for dates (`memberships.start_date`, `schedules.date`, ...).
pub const DATE_FMT: &str = "%Y-%m-%d";
/// Storage format for timestamps (`visits.check_in`, `visits.check_out`).
/// Lexical order equals chronological order, so SQL can compare them as text.
pub const TS_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of "today" and "now" for every engine operation.
///
/// `Fixed` pins the clock (tests, `--now` on the CLI); `System` reads local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => Local::now().naive_local().with_nanosecond(0).unwrap_or_default(),
            Clock::Fixed(dt) => *dt,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Parse a `--now` override ("YYYY-MM-DD HH:MM" or "YYYY-MM-DD").
    pub fn from_override(value: Option<&str>) -> AppResult<Self> {
        match value {
            None => Ok(Clock::System),
            Some(s) => parse_datetime(s)
                .map(Clock::Fixed)
                .ok_or_else(|| AppError::InvalidDate(s.to_string())),
        }
    }
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT).ok()
}

pub fn parse_date_arg(s: &str) -> AppResult<NaiveDate> {
    parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

/// Accepts "YYYY-MM-DD HH:MM:SS", "YYYY-MM-DD HH:MM" or a bare date (midnight).
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, TS_FMT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M"))
        .ok()
        .or_else(|| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

pub fn fmt_date(d: &NaiveDate) -> String {
    d.format(DATE_FMT).to_string()
}

pub fn fmt_ts(dt: &NaiveDateTime) -> String {
    dt.format(TS_FMT).to_string()
}

/// `d` shifted by `days`; out-of-range results are an input error, not a panic.
pub fn add_days(d: NaiveDate, days: i64) -> AppResult<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| d.checked_add_signed(delta))
        .ok_or_else(|| AppError::InvalidArgument(format!("{} {:+} days is out of range", d, days)))
}

/// Monday of the week containing `d`.
pub fn week_start(d: NaiveDate) -> NaiveDate {
    d - Duration::days(d.weekday().num_days_from_monday() as i64)
}

/// Start and end of the one-hour window `[date hour:00, date hour+1:00)`.
pub fn hour_window(date: NaiveDate, hour: u32) -> AppResult<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveTime::from_hms_opt(hour, 0, 0).ok_or(AppError::InvalidHour(hour))?;
    let start = date.and_time(start);
    Ok((start, start + Duration::hours(1)))
}
