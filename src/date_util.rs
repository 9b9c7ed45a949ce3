use chrono::{Datelike, Duration, NaiveDateTime, NaiveTime, SubsecRound, Timelike};

/// Storage format for timestamps. Fixed width, so lexical order is
/// chronological order and the first ten characters are the day key.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Length of the `YYYY-MM-DD` prefix of a stored timestamp.
pub const DAY_KEY_LEN: usize = 10;

/// Current instant as a UTC-naive timestamp, truncated to the stored
/// microsecond precision.
pub fn now_utc() -> NaiveDateTime {
    chrono::Utc::now().naive_utc().trunc_subsecs(6)
}

pub fn format_timestamp(ts: NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp. Accepts any fractional precision, or none.
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
}

/// `YYYY-MM-DD` key of the UTC day containing `ts`.
pub fn day_key(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d").to_string()
}

/// Midnight at the start of the UTC day containing `ts`.
pub fn start_of_day(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN)
}

/// Midnight on the first day of the month containing `ts`.
pub fn start_of_month(ts: NaiveDateTime) -> NaiveDateTime {
    let first = ts.date() - Duration::days(i64::from(ts.day0()));
    first.and_time(NaiveTime::MIN)
}

/// Same day and minute/second as `ts`, with the hour replaced.
pub fn at_hour(ts: NaiveDateTime, hour: u32) -> NaiveDateTime {
    ts - Duration::hours(i64::from(ts.hour())) + Duration::hours(i64::from(hour.min(23)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_format_is_fixed_width() {
        let a = format_timestamp(ts(2025, 1, 2, 3, 4, 5));
        assert_eq!(a, "2025-01-02T03:04:05.000000");
        let b = format_timestamp(ts(2025, 12, 31, 23, 59, 59) + Duration::microseconds(42));
        assert_eq!(b, "2025-12-31T23:59:59.000042");
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }

    #[test]
    fn test_parse_round_trips_and_tolerates_missing_fraction() {
        let t = ts(2025, 3, 9, 14, 30, 0) + Duration::microseconds(123_456);
        assert_eq!(parse_timestamp(&format_timestamp(t)).unwrap(), t);
        assert_eq!(
            parse_timestamp("2025-03-09T14:30:00").unwrap(),
            ts(2025, 3, 9, 14, 30, 0)
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_day_key_matches_timestamp_prefix() {
        let t = ts(2024, 2, 29, 23, 59, 59);
        assert_eq!(day_key(t), "2024-02-29");
        assert_eq!(&format_timestamp(t)[..DAY_KEY_LEN], "2024-02-29");
    }

    #[test]
    fn test_start_of_day() {
        assert_eq!(start_of_day(ts(2025, 6, 15, 17, 45, 12)), ts(2025, 6, 15, 0, 0, 0));
    }

    #[test]
    fn test_start_of_month() {
        assert_eq!(start_of_month(ts(2025, 6, 15, 17, 45, 12)), ts(2025, 6, 1, 0, 0, 0));
        assert_eq!(start_of_month(ts(2025, 3, 1, 0, 0, 1)), ts(2025, 3, 1, 0, 0, 0));
        assert_eq!(start_of_month(ts(2024, 12, 31, 23, 0, 0)), ts(2024, 12, 1, 0, 0, 0));
    }

    #[test]
    fn test_at_hour_keeps_minutes_and_day() {
        assert_eq!(at_hour(ts(2025, 6, 15, 17, 45, 12), 9), ts(2025, 6, 15, 9, 45, 12));
        assert_eq!(at_hour(ts(2025, 6, 15, 2, 5, 0), 14), ts(2025, 6, 15, 14, 5, 0));
    }

    #[test]
    fn test_now_survives_storage_format() {
        let now = now_utc();
        assert_eq!(parse_timestamp(&format_timestamp(now)).unwrap(), now);
    }
}
