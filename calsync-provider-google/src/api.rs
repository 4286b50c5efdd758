//! Google Calendar v3 over REST.

use std::path::Path;

use calsync_core::{
    CalSyncError, CalSyncResult, Calendar, CalendarProvider, Event, EventQuery,
};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::session::Session;
use crate::types::{ApiErrorBody, Page};

const API_BASE: &str = "https://www.googleapis.com/calendar/v3/";
const EVENTS_PAGE_SIZE: &str = "250";

pub struct GoogleCalendar {
    http: Client,
    access_token: String,
    base: String,
}

impl GoogleCalendar {
    /// Connect using the token file at `token_file`, refreshing it if needed.
    pub fn connect(token_file: &Path) -> CalSyncResult<Self> {
        let http = Client::new();
        let session = Session::load_valid(token_file, &http)?;
        Ok(Self::with_token(http, session.access_token()))
    }

    pub fn with_token(http: Client, access_token: &str) -> Self {
        GoogleCalendar {
            http,
            access_token: access_token.to_string(),
            base: API_BASE.to_string(),
        }
    }

    /// Point at another server, e.g. a local mock.
    pub fn with_base_url(mut self, base: &str) -> Self {
        self.base = base.to_string();
        self
    }

    /// Build `{base}/{segments...}` with each segment percent-encoded, so
    /// ids like `foo@group.calendar.google.com` or `a/b` stay one segment.
    fn url(&self, segments: &[&str]) -> CalSyncResult<Url> {
        let mut url = Url::parse(&self.base)
            .map_err(|e| CalSyncError::Provider(format!("Invalid API base URL {}: {}", self.base, e)))?;
        url.path_segments_mut()
            .map_err(|_| CalSyncError::Provider(format!("Invalid API base URL {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder, what: &str) -> CalSyncResult<Response> {
        request
            .bearer_auth(&self.access_token)
            .send()
            .map_err(|e| CalSyncError::Provider(format!("{}: {}", what, e)))
    }

    /// Fetch every page of a list endpoint.
    fn list_all<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
        what: &str,
    ) -> CalSyncResult<Vec<T>> {
        let mut items = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.http.get(url.clone()).query(query);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }

            let response = check(self.send(request, what)?, what)?;
            let page: Page<T> = response
                .json()
                .map_err(|e| CalSyncError::Provider(format!("{}: bad response: {}", what, e)))?;

            items.extend(page.items);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(items)
    }
}

/// Turn a non-2xx response into a provider error carrying the API message.
fn check(response: Response, what: &str) -> CalSyncResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(CalSyncError::Provider(error_message(what, status, &body)))
}

fn error_message(what: &str, status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) if !parsed.error.message.is_empty() => {
            format!("{} ({}): {}", what, status, parsed.error.message)
        }
        _ => format!("{} ({}): {}", what, status, body.trim()),
    }
}

/// Query string for an event listing.
fn events_query(query: &EventQuery) -> Vec<(&'static str, String)> {
    vec![
        ("timeMin", query.window.from_rfc3339()),
        ("timeMax", query.window.to_rfc3339()),
        ("singleEvents", query.single_events.to_string()),
        ("orderBy", query.order_by.as_str().to_string()),
        ("maxResults", EVENTS_PAGE_SIZE.to_string()),
    ]
}

/// The import endpoint requires an iCalUID.
fn import_body(event: &Event) -> Event {
    let mut body = event.clone();
    if body.ical_uid.is_none() {
        body.ical_uid = Some(format!("{}@calsync", uuid::Uuid::new_v4()));
    }
    body
}

impl CalendarProvider for GoogleCalendar {
    fn list_calendars(&self, max_results: u32) -> CalSyncResult<Vec<Calendar>> {
        let url = self.url(&["users", "me", "calendarList"])?;
        let calendars: Vec<Calendar> = self.list_all(
            url,
            &[("maxResults", max_results.to_string())],
            "Failed to list calendars",
        )?;
        debug!(count = calendars.len(), "listed calendars");
        Ok(calendars)
    }

    fn list_events(&self, calendar_id: &str, query: &EventQuery) -> CalSyncResult<Vec<Event>> {
        let url = self.url(&["calendars", calendar_id, "events"])?;
        let what = format!("Failed to list events of {}", calendar_id);
        self.list_all(url, &events_query(query), &what)
    }

    fn import_event(&self, calendar_id: &str, event: &Event) -> CalSyncResult<Event> {
        let url = self.url(&["calendars", calendar_id, "events", "import"])?;
        let what = format!("Failed to import event into {}", calendar_id);

        let response = self.send(self.http.post(url).json(&import_body(event)), &what)?;
        check(response, &what)?
            .json()
            .map_err(|e| CalSyncError::Provider(format!("{}: bad response: {}", what, e)))
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalSyncResult<()> {
        let url = self.url(&["calendars", calendar_id, "events", event_id])?;
        let what = format!("Failed to delete event {} from {}", event_id, calendar_id);

        let response = self.send(self.http.delete(url), &what)?;

        // Already gone counts as deleted.
        if response.status() == StatusCode::GONE {
            debug!(calendar_id, event_id, "event already deleted");
            return Ok(());
        }

        check(response, &what)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_core::{TimeWindow, WindowSpec};
    use chrono::{TimeZone, Utc};

    fn client() -> GoogleCalendar {
        GoogleCalendar::with_token(Client::new(), "token")
    }

    fn window() -> TimeWindow {
        WindowSpec::default()
            .around(Utc.with_ymd_and_hms(2020, 1, 10, 9, 30, 0).unwrap())
            .unwrap()
    }

    #[test]
    fn test_url_encodes_ids() {
        let url = client()
            .url(&["calendars", "team@group.calendar.google.com", "events", "a/b c"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/team@group.calendar.google.com/events/a%2Fb%20c"
        );
    }

    #[test]
    fn test_url_with_custom_base() {
        let client = client().with_base_url("http://localhost:8080/v3");
        let url = client.url(&["users", "me", "calendarList"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/v3/users/me/calendarList");
    }

    #[test]
    fn test_events_query_for_copy() {
        let query = events_query(&EventQuery::instances(window()));
        assert_eq!(
            query,
            vec![
                ("timeMin", "2020-01-03T09:30:00Z".to_string()),
                ("timeMax", "2020-04-03T09:30:00Z".to_string()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", "250".to_string()),
            ]
        );
    }

    #[test]
    fn test_events_query_for_reconcile() {
        let query = events_query(&EventQuery::records(window()));
        assert!(query.contains(&("singleEvents", "false".to_string())));
        assert!(query.contains(&("orderBy", "updated".to_string())));
    }

    #[test]
    fn test_import_body_gets_ical_uid() {
        let event = Event {
            summary: Some("Lunch".into()),
            ..Default::default()
        };
        let body = import_body(&event);
        assert!(body.ical_uid.as_deref().unwrap().ends_with("@calsync"));
        assert_eq!(body.summary, event.summary);

        let existing = Event {
            ical_uid: Some("abc@google.com".into()),
            ..Default::default()
        };
        assert_eq!(import_body(&existing), existing);
    }

    #[test]
    fn test_error_message_uses_api_message() {
        let msg = error_message(
            "Failed to list calendars",
            StatusCode::FORBIDDEN,
            r#"{"error": {"code": 403, "message": "Insufficient Permission"}}"#,
        );
        assert_eq!(msg, "Failed to list calendars (403 Forbidden): Insufficient Permission");

        let msg = error_message("Failed", StatusCode::BAD_GATEWAY, "upstream down\n");
        assert_eq!(msg, "Failed (502 Bad Gateway): upstream down");
    }
}
