use crate::components::google_calendar::models::CalendarEvent;
use crate::components::google_calendar::time::start_time_of_day;

const TODAY_HEADER: &str = "Today: ";
const SEPARATOR: &str = "============*============";
const TOMORROW_HEADER: &str = "Tomorrow";

/// Render today's and tomorrow's events as one notification body
pub fn format_digest(today: &[CalendarEvent], tomorrow: &[CalendarEvent]) -> String {
    let mut message = String::new();

    message.push_str(TODAY_HEADER);
    message.push('\n');
    push_events(&mut message, today);

    message.push_str(SEPARATOR);
    message.push('\n');
    message.push_str(TOMORROW_HEADER);
    message.push('\n');
    push_events(&mut message, tomorrow);

    // Exactly one trailing newline goes
    message.pop();
    message
}

fn push_events(message: &mut String, events: &[CalendarEvent]) {
    for event in events {
        message.push_str(&format_event(event));
        message.push('\n');
    }
}

/// `"{summary} at HH:MM:SS"` or `"{summary} all day"`
pub fn format_event(event: &CalendarEvent) -> String {
    match start_time_of_day(event) {
        Some(time) => format!("{} at {}", event.summary, time),
        None => format!("{} all day", event.summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::google_calendar::models::EventStart;

    fn timed(summary: &str, date_time: &str) -> CalendarEvent {
        CalendarEvent {
            id: None,
            summary: summary.to_string(),
            start: EventStart::DateTime {
                date_time: date_time.to_string(),
            },
        }
    }

    fn all_day(summary: &str, date: &str) -> CalendarEvent {
        CalendarEvent {
            id: None,
            summary: summary.to_string(),
            start: EventStart::Date {
                date: date.to_string(),
            },
        }
    }

    #[test]
    fn test_empty_digest() {
        assert_eq!(
            format_digest(&[], &[]),
            "Today: \n============*============\nTomorrow"
        );
    }

    #[test]
    fn test_event_lines() {
        assert_eq!(
            format_event(&timed("Standup", "2024-01-05T14:30:00Z")),
            "Standup at 14:30:00"
        );
        assert_eq!(
            format_event(&all_day("Holiday", "2024-01-05")),
            "Holiday all day"
        );
    }

    #[test]
    fn test_single_event_per_day() {
        let today = [timed("Standup", "2024-01-05T09:00:00+02:00")];
        let tomorrow = [all_day("Trip", "2024-01-06")];

        assert_eq!(
            format_digest(&today, &tomorrow),
            "Today: \nStandup at 09:00:00\n============*============\nTomorrow\nTrip all day"
        );
    }

    #[test]
    fn test_preserves_supplied_order() {
        // Deliberately not chronological: the formatter must not sort
        let today = [
            timed("C", "2024-01-05T18:00:00Z"),
            all_day("A", "2024-01-05"),
            timed("B", "2024-01-05T08:00:00Z"),
        ];
        let tomorrow = [
            timed("E", "2024-01-06T10:00:00Z"),
            timed("D", "2024-01-06T07:00:00Z"),
        ];

        let digest = format_digest(&today, &tomorrow);
        let lines: Vec<&str> = digest.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Today: ",
                "C at 18:00:00",
                "A all day",
                "B at 08:00:00",
                "============*============",
                "Tomorrow",
                "E at 10:00:00",
                "D at 07:00:00",
            ]
        );
    }

    #[test]
    fn test_duplicate_events_are_kept() {
        let today = [
            timed("Standup", "2024-01-05T09:00:00Z"),
            timed("Standup", "2024-01-05T09:00:00Z"),
        ];
        let digest = format_digest(&today, &[]);
        assert_eq!(digest.matches("Standup at 09:00:00").count(), 2);
    }

    #[test]
    fn test_untitled_event() {
        assert_eq!(format_event(&timed("", "2024-01-05T09:00:00Z")), " at 09:00:00");
    }
}
