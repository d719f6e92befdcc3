use super::formatter::format_digest;
use crate::components::google_calendar::{CalendarEvent, CalendarSource};
use crate::components::pushbullet::{Notifier, PushService};
use crate::error::{AppResult, Error};
use crate::utils::time::next_day;
use chrono::NaiveDate;
use tracing::{error, info, warn};

/// Fetch today and tomorrow, push the digest, then report any fetch failures.
///
/// A failed fetch leaves that day empty instead of aborting the run. Error
/// notes go out after the digest because sending the digest deletes every
/// earlier push on the account.
pub async fn run_once<C, P>(
    calendar: &C,
    notifier: &Notifier<P>,
    today: NaiveDate,
) -> AppResult<String>
where
    C: CalendarSource,
    P: PushService,
{
    let tomorrow = next_day(today)?;
    let mut failures = Vec::new();

    let today_events = fetch_day(calendar, today, &mut failures).await;
    let tomorrow_events = fetch_day(calendar, tomorrow, &mut failures).await;

    let digest = format_digest(&today_events, &tomorrow_events);
    let delivery = notifier.push_digest(&digest).await;

    // Fetch failures are reported even when the digest delivery failed
    for failure in failures {
        let note = format!("An error occurred: {}", failure);
        if let Err(e) = notifier.push_error(&note).await {
            error!("Failed to report fetch error: {}", e);
        }
    }

    delivery.map(|_| digest)
}

async fn fetch_day<C: CalendarSource>(
    calendar: &C,
    date: NaiveDate,
    failures: &mut Vec<Error>,
) -> Vec<CalendarEvent> {
    match calendar.fetch_events(date).await {
        Ok(events) => {
            info!("{} events on {}", events.len(), date);
            events
        }
        Err(e) => {
            warn!("Could not fetch events for {}: {}", date, e);
            failures.push(e);
            Vec::new()
        }
    }
}
