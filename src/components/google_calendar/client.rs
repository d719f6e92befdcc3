use super::models::{ApiErrorResponse, CalendarEvent, EventsPage};
use super::token::AuthorizationToken;
use crate::error::{calendar_fetch_error, AppResult, Error};
use crate::utils::time::DayWindow;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, Response};
use tracing::debug;
use url::Url;

/// Anything that can list the events of one day
#[async_trait]
pub trait CalendarSource: Send + Sync {
    async fn fetch_events(&self, date: NaiveDate) -> AppResult<Vec<CalendarEvent>>;
}

/// Reads the authenticated account's primary calendar
#[derive(Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl GoogleCalendarClient {
    pub fn new(client: Client, base_url: &str, token: &AuthorizationToken) -> AppResult<Self> {
        let access_token = token
            .bearer()
            .ok_or_else(|| calendar_fetch_error("No access token available"))?
            .to_string();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    fn events_url(&self, window: &DayWindow, page_token: Option<&str>) -> AppResult<Url> {
        let mut url = Url::parse(&format!("{}/calendars/primary/events", self.base_url))
            .map_err(|e| calendar_fetch_error(&format!("Failed to parse URL: {}", e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("timeMin", &window.time_min())
                .append_pair("timeMax", &window.time_max())
                .append_pair("singleEvents", "true")
                .append_pair("orderBy", "startTime");
            if let Some(page_token) = page_token {
                query.append_pair("pageToken", page_token);
            }
        }

        Ok(url)
    }

    async fn fetch_page(&self, url: Url) -> AppResult<EventsPage> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| calendar_fetch_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| calendar_fetch_error(&format!("Failed to parse events response: {}", e)))
    }
}

#[async_trait]
impl CalendarSource for GoogleCalendarClient {
    async fn fetch_events(&self, date: NaiveDate) -> AppResult<Vec<CalendarEvent>> {
        let window = DayWindow::for_date(date);
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.events_url(&window, page_token.as_deref())?;
            let page = self.fetch_page(url).await?;
            events.extend(page.items);

            match page.next_page_token {
                Some(next) if page_token.as_deref() == Some(next.as_str()) => {
                    return Err(calendar_fetch_error(&format!(
                        "Pagination did not advance past page token {}",
                        next
                    )));
                }
                Some(next) if !next.is_empty() => page_token = Some(next),
                _ => break,
            }
        }

        debug!("Fetched {} events for {}", events.len(), date);
        Ok(events)
    }
}

/// Prefer Google's error message over the raw body
async fn error_from_response(response: Response) -> Error {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Could not read error response".to_string());

    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .ok()
        .and_then(|parsed| parsed.error.message)
        .unwrap_or(body);

    calendar_fetch_error(&format!("HTTP {} - {}", status, message))
}
