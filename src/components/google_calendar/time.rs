use super::models::{CalendarEvent, EventStart};
use chrono::DateTime;

/// Time-of-day of a timed event as `HH:MM:SS`, or `None` for all-day events
pub fn start_time_of_day(event: &CalendarEvent) -> Option<String> {
    match &event.start {
        EventStart::DateTime { date_time } => Some(time_of_day(date_time)),
        EventStart::Date { .. } => None,
    }
}

/// Wall-clock time in the timestamp's own offset
fn time_of_day(date_time: &str) -> String {
    match DateTime::parse_from_rfc3339(date_time) {
        Ok(dt) => dt.format("%H:%M:%S").to_string(),
        Err(_) => slice_time_of_day(date_time),
    }
}

/// Fallback for timestamps chrono rejects: keep what follows `T`, minus fraction and zone
fn slice_time_of_day(date_time: &str) -> String {
    let time = date_time
        .split_once('T')
        .map(|(_, time)| time)
        .unwrap_or(date_time);
    let end = time
        .find(|c: char| matches!(c, '.' | 'Z' | 'z' | '+' | '-'))
        .unwrap_or(time.len());
    time[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed(date_time: &str) -> CalendarEvent {
        CalendarEvent {
            id: None,
            summary: "Event".to_string(),
            start: EventStart::DateTime {
                date_time: date_time.to_string(),
            },
        }
    }

    #[test]
    fn test_time_of_day_keeps_event_offset() {
        assert_eq!(
            start_time_of_day(&timed("2024-01-05T14:30:00Z")).as_deref(),
            Some("14:30:00")
        );
        assert_eq!(
            start_time_of_day(&timed("2024-01-05T09:15:00+02:00")).as_deref(),
            Some("09:15:00")
        );
        assert_eq!(
            start_time_of_day(&timed("2024-01-05T23:05:30.250-05:00")).as_deref(),
            Some("23:05:30")
        );
    }

    #[test]
    fn test_all_day_has_no_time() {
        let event = CalendarEvent {
            id: None,
            summary: "Holiday".to_string(),
            start: EventStart::Date {
                date: "2024-01-05".to_string(),
            },
        };
        assert_eq!(start_time_of_day(&event), None);
    }

    #[test]
    fn test_fallback_slicing() {
        assert_eq!(slice_time_of_day("2024-01-05T14:30:00"), "14:30:00");
        assert_eq!(slice_time_of_day("2024-01-05T14:30:00.5Z"), "14:30:00");
        assert_eq!(slice_time_of_day("2024-01-05T07:00:00-0800"), "07:00:00");
        assert_eq!(slice_time_of_day("garbage"), "garbage");
    }
}
