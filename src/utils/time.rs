use crate::error::{other_error, AppResult};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Query window covering one whole calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DayWindow {
    /// Window from 00:00:00.000000 to 23:59:59.999999 on `date`
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            start: date.and_time(NaiveTime::default()),
            end: date.and_time(end_of_day()),
        }
    }

    /// `timeMin` query value
    pub fn time_min(&self) -> String {
        format_utc_suffixed(&self.start)
    }

    /// `timeMax` query value
    pub fn time_max(&self) -> String {
        format_utc_suffixed(&self.end)
    }
}

fn end_of_day() -> NaiveTime {
    // 23:59:59.999999 is always representable
    NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999).unwrap_or_default()
}

/// ISO 8601 with a `Z` suffix; the fraction is only printed when non-zero
fn format_utc_suffixed(dt: &NaiveDateTime) -> String {
    format!("{}Z", dt.format("%Y-%m-%dT%H:%M:%S%.f"))
}

/// The calendar day after `date`, carrying into month and year
pub fn next_day(date: NaiveDate) -> AppResult<NaiveDate> {
    date.succ_opt()
        .ok_or_else(|| other_error(&format!("No day after {}", date)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_covers_whole_day() {
        for d in [date(2024, 1, 5), date(2024, 2, 29), date(2023, 12, 31)] {
            let window = DayWindow::for_date(d);

            assert_eq!(window.start.date(), d);
            assert_eq!(window.end.date(), d);
            assert!(window.start <= window.end);

            assert_eq!(
                (window.start.hour(), window.start.minute(), window.start.second()),
                (0, 0, 0)
            );
            assert_eq!(window.start.nanosecond(), 0);
            assert_eq!(
                (window.end.hour(), window.end.minute(), window.end.second()),
                (23, 59, 59)
            );
            assert_eq!(window.end.nanosecond(), 999_999_000);
        }
    }

    #[test]
    fn test_window_query_format() {
        let window = DayWindow::for_date(date(2024, 1, 5));
        assert_eq!(window.time_min(), "2024-01-05T00:00:00Z");
        assert_eq!(window.time_max(), "2024-01-05T23:59:59.999999Z");
    }

    #[test]
    fn test_next_day_carries() {
        assert_eq!(next_day(date(2024, 1, 5)).unwrap(), date(2024, 1, 6));
        assert_eq!(next_day(date(2024, 1, 31)).unwrap(), date(2024, 2, 1));
        assert_eq!(next_day(date(2024, 2, 28)).unwrap(), date(2024, 2, 29));
        assert_eq!(next_day(date(2023, 2, 28)).unwrap(), date(2023, 3, 1));

        let new_year = next_day(date(2024, 12, 31)).unwrap();
        assert_eq!((new_year.year(), new_year.month(), new_year.day()), (2025, 1, 1));
    }

    #[test]
    fn test_next_day_at_calendar_end() {
        assert!(next_day(NaiveDate::MAX).is_err());
    }
}
