use serde::{Deserialize, Serialize};

/// A single entry from the events list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: Option<String>,
    /// Untitled events have no summary in the API response
    #[serde(default)]
    pub summary: String,
    pub start: EventStart,
}

/// Start marker of an event: a date-time for timed events, a plain date for all-day ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventStart {
    DateTime {
        #[serde(rename = "dateTime")]
        date_time: String,
    },
    Date {
        date: String,
    },
}

/// One page of `GET /calendars/{id}/events`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<CalendarEvent>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Error envelope returned by Google APIs
#[derive(Debug, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
}
