//! Time utilities: parsing HH:MM, half-open interval overlap, formatting.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;

pub const TIME_FMT: &str = "%H:%M";

pub fn parse_time(t: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(t, TIME_FMT).ok()
}

pub fn parse_time_arg(t: &str) -> AppResult<NaiveTime> {
    parse_time(t).ok_or_else(|| AppError::InvalidTime(t.to_string()))
}

pub fn fmt_time(t: &NaiveTime) -> String {
    t.format(TIME_FMT).to_string()
}

/// `[a_start, a_end)` and `[b_start, b_end)` share at least one instant.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> NaiveTime {
        parse_time(s).unwrap()
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        assert!(!overlaps(t("09:00"), t("10:00"), t("10:00"), t("11:00")));
        assert!(!overlaps(t("10:00"), t("11:00"), t("09:00"), t("10:00")));
    }

    #[test]
    fn nested_and_partial_intervals_overlap() {
        assert!(overlaps(t("09:00"), t("12:00"), t("10:00"), t("11:00")));
        assert!(overlaps(t("09:30"), t("10:30"), t("10:00"), t("11:00")));
    }

    #[test]
    fn bad_time_is_rejected() {
        assert!(matches!(parse_time_arg("25:00"), Err(AppError::InvalidTime(_))));
    }
}
