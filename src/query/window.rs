use chrono::{Duration, NaiveDateTime};

use crate::date_util::{start_of_day, start_of_month};

/// A time window for analytics, resolved against the instant of the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// From `n` days before the call up to the call. Not calendar aligned.
    TrailingDays(u32),
    /// From midnight on the first of the current month.
    MonthToDate,
    /// The current UTC day, midnight to midnight.
    Today,
}

impl Window {
    /// Inclusive start and exclusive end. `None` means no upper bound: records
    /// are read as of the call, so everything after `start` is in range.
    pub fn bounds(&self, now: NaiveDateTime) -> (NaiveDateTime, Option<NaiveDateTime>) {
        match self {
            Window::TrailingDays(n) => (now - Duration::days(i64::from(*n)), None),
            Window::MonthToDate => (start_of_month(now), None),
            Window::Today => {
                let start = start_of_day(now);
                (start, Some(start + Duration::days(1)))
            }
        }
    }

    pub fn to_key(&self) -> String {
        match self {
            Window::TrailingDays(n) => format!("{n}d"),
            Window::MonthToDate => "mtd".to_string(),
            Window::Today => "today".to_string(),
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, m, d)
            .unwrap()
            .and_hms_opt(h, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_trailing_days_is_rolling() {
        let (start, end) = Window::TrailingDays(7).bounds(ts(3, 10, 15));
        assert_eq!(start, ts(3, 3, 15));
        assert_eq!(end, None);
    }

    #[test]
    fn test_month_to_date() {
        let (start, end) = Window::MonthToDate.bounds(ts(3, 10, 15));
        assert_eq!(
            start,
            NaiveDate::from_ymd_opt(2025, 3, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(end, None);
    }

    #[test]
    fn test_today_is_midnight_to_midnight() {
        let (start, end) = Window::Today.bounds(ts(3, 31, 23));
        let midnight = NaiveDate::from_ymd_opt(2025, 3, 31)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(start, midnight);
        assert_eq!(end, Some(midnight + Duration::days(1)));
    }

    #[test]
    fn test_to_key() {
        assert_eq!(Window::TrailingDays(30).to_key(), "30d");
        assert_eq!(Window::MonthToDate.to_string(), "mtd");
        assert_eq!(Window::Today.to_key(), "today");
    }
}
