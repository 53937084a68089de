//! Timestamp parsing and time window helpers

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// Formats accepted for timestamps without an offset
const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a timestamp in one of the supported formats
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD` and
/// RFC 3339. Values without an offset are interpreted as UTC.
pub fn parse_datetime(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Trailing window `[now - days, now]`
///
/// Fails when the window start falls outside the representable date range.
pub fn time_window(now: DateTime<Utc>, days: i64) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start = TimeDelta::try_days(days)
        .and_then(|span| now.checked_sub_signed(span))
        .ok_or_else(|| {
            Error::configuration(format!("Time window of {} days is out of range", days))
        })?;
    Ok((start, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_supported_formats() {
        let expected = Utc.with_ymd_and_hms(2023, 1, 1, 10, 30, 0).unwrap();
        assert_eq!(parse_datetime("2023-01-01 10:30:00"), Some(expected));
        assert_eq!(parse_datetime("2023-01-01T10:30:00"), Some(expected));
        assert_eq!(parse_datetime("2023-01-01T10:30:00Z"), Some(expected));
        assert_eq!(parse_datetime(" 2023-01-01 10:30:00 "), Some(expected));
        assert_eq!(
            parse_datetime("2023-01-01"),
            Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_datetime("yesterday"), None);
        assert_eq!(parse_datetime("2023-13-01"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn test_time_window() {
        let now = Utc.with_ymd_and_hms(2023, 1, 8, 12, 0, 0).unwrap();
        let (start, end) = time_window(now, 7).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap());
        assert_eq!(end, now);
    }

    #[test]
    fn test_time_window_out_of_range() {
        let now = Utc.with_ymd_and_hms(2023, 1, 8, 12, 0, 0).unwrap();

        // Representable as a span but before the earliest date
        assert!(matches!(
            time_window(now, 1_000_000_000),
            Err(Error::Configuration { .. })
        ));
        // Too large for a span at all
        assert!(matches!(
            time_window(now, i64::MAX),
            Err(Error::Configuration { .. })
        ));
    }
}
