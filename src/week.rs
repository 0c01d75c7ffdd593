// src/week.rs
//! ISO 8601 week bucketing.
//!
//! The bucket year is the ISO week-numbering year, not the calendar year:
//! 2024-12-30 is `2025-W01` and 2023-01-01 is `2022-W52`.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fmt;

/// An (ISO week-numbering year, week 1..=53) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeekBucket {
    pub year: i32,
    pub week: u32,
}

impl fmt::Display for IsoWeekBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

/// Pure ISO week computation for a calendar date.
pub fn iso_week_bucket(date: NaiveDate) -> IsoWeekBucket {
    let iw = date.iso_week();
    IsoWeekBucket {
        year: iw.year(),
        week: iw.week(),
    }
}

/// Parse an ISO-8601 timestamp down to the calendar date it was written in.
///
/// Accepts RFC 3339 (`2024-01-17T09:15:00Z`, `+03:00` offsets), naive date-times
/// (`T` or space separated, optional fractional seconds) and bare dates.
/// Offsets are not normalized to UTC; the date as written decides the week.
pub fn parse_timestamp_date(ts: &str) -> Option<NaiveDate> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, fmt) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(ts, "%Y-%m-%d").ok()
}

/// Week label (`YYYY-W##`) for a timestamp string, or `None` if it does not parse.
pub fn week_label(ts: &str) -> Option<String> {
    parse_timestamp_date(ts).map(|d| iso_week_bucket(d).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn year_boundaries_follow_iso_rule() {
        assert_eq!(iso_week_bucket(d(2024, 12, 30)).to_string(), "2025-W01");
        assert_eq!(iso_week_bucket(d(2023, 1, 1)).to_string(), "2022-W52");
        assert_eq!(iso_week_bucket(d(2021, 1, 3)).to_string(), "2020-W53");
        assert_eq!(iso_week_bucket(d(2020, 12, 31)).to_string(), "2020-W53");
        assert_eq!(iso_week_bucket(d(2026, 1, 1)).to_string(), "2026-W01");
    }

    #[test]
    fn mid_year_weeks_are_zero_padded() {
        assert_eq!(iso_week_bucket(d(2024, 1, 17)).to_string(), "2024-W03");
        assert_eq!(iso_week_bucket(d(2024, 3, 1)).to_string(), "2024-W09");
    }

    #[test]
    fn accepts_common_iso_shapes() {
        for ts in [
            "2024-01-16T14:30:00Z",
            "2024-01-16T14:30:00+03:00",
            "2024-01-16T14:30:00.123456",
            "2024-01-16 14:30:00",
            "2024-01-16T14:30",
            "2024-01-16",
        ] {
            assert_eq!(week_label(ts).as_deref(), Some("2024-W03"), "{ts}");
        }
    }

    #[test]
    fn offset_date_is_kept_as_written() {
        // 23:30 at -05:00 is already Monday in UTC, but the local date is Sunday.
        assert_eq!(
            week_label("2023-01-01T23:30:00-05:00").as_deref(),
            Some("2022-W52")
        );
    }

    #[test]
    fn rejects_garbage() {
        for ts in ["", "yesterday", "2024-13-01", "2024-02-30T00:00:00Z", "17/01/2024"] {
            assert_eq!(week_label(ts), None, "{ts}");
        }
    }
}
