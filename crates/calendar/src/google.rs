//! Google Calendar v3 client for the user's `primary` calendar.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use gigify_core::calendar::{encode_properties, ExternalCalendarEvent};
use gigify_core::time_window::TimeWindow;
use gigify_core::types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{CalendarClient, CalendarError, MirrorEvent};

/// HTTP request timeout. The engine applies its own bound on top.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

/// Configuration for [`GoogleCalendarClient`].
#[derive(Debug, Clone)]
pub struct GoogleCalendarConfig {
    pub base_url: String,
}

impl Default for GoogleCalendarConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GoogleCalendarConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable                   | Default                      |
    /// |----------------------------|------------------------------|
    /// | `GOOGLE_CALENDAR_BASE_URL` | `https://www.googleapis.com` |
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("GOOGLE_CALENDAR_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        }
    }
}

// ---- wire types ----

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<GoogleEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleEvent {
    id: String,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    location: Option<String>,
    start: Option<EventTime>,
    end: Option<EventTime>,
    #[serde(default)]
    extended_properties: Option<ExtendedProperties>,
}

/// Either a timed instant or an all-day date.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventTime {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_time: Option<chrono::DateTime<chrono::FixedOffset>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    date: Option<NaiveDate>,
}

impl EventTime {
    fn instant(&self) -> Option<Timestamp> {
        match (self.date_time, self.date) {
            (Some(dt), _) => Some(dt.with_timezone(&Utc)),
            (None, Some(d)) => d.and_hms_opt(0, 0, 0).map(|n| n.and_utc()),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ExtendedProperties {
    #[serde(default)]
    private: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertBody<'a> {
    summary: &'a str,
    description: &'a str,
    location: &'a str,
    start: EventTime,
    end: EventTime,
    extended_properties: ExtendedProperties,
}

#[derive(Debug, Deserialize)]
struct Inserted {
    id: String,
}

/// Convert one provider entry. Entries without a usable time range are
/// dropped (cancelled instances, malformed data).
fn to_external(event: GoogleEvent) -> Option<ExternalCalendarEvent> {
    let start = event.start.as_ref()?.instant()?;
    let end = event.end.as_ref()?.instant()?;
    let window = match TimeWindow::new(start, end) {
        Ok(w) => w,
        Err(_) => {
            tracing::debug!(external_id = %event.id, "Skipping calendar entry with empty range");
            return None;
        }
    };
    let properties = event
        .extended_properties
        .map(|p| p.private)
        .unwrap_or_default();
    Some(ExternalCalendarEvent::from_provider(
        event.id,
        event.summary.unwrap_or_default(),
        window,
        event.location,
        event.description,
        &properties,
    ))
}

/// Google Calendar v3 client.
pub struct GoogleCalendarClient {
    client: reqwest::Client,
    config: GoogleCalendarConfig,
}

impl GoogleCalendarClient {
    pub fn new(config: GoogleCalendarConfig) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, config })
    }

    /// Reuse an existing client (shared connection pool).
    pub fn with_client(client: reqwest::Client, config: GoogleCalendarConfig) -> Self {
        Self { client, config }
    }

    fn events_url(&self) -> String {
        format!("{}/calendar/v3/calendars/primary/events", self.config.base_url)
    }

    /// Map non-2xx responses to [`CalendarError`].
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, CalendarError> {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CalendarError::Unauthorized {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(CalendarError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

#[async_trait::async_trait]
impl CalendarClient for GoogleCalendarClient {
    async fn list_upcoming(
        &self,
        credential: &str,
        time_min: Timestamp,
        max_results: u32,
    ) -> Result<Vec<ExternalCalendarEvent>, CalendarError> {
        let response = self
            .client
            .get(self.events_url())
            .bearer_auth(credential)
            .query(&[
                ("timeMin", time_min.to_rfc3339()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", max_results.to_string()),
            ])
            .send()
            .await?;

        let list: EventList = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::InvalidResponse(e.to_string()))?;

        Ok(list.items.into_iter().filter_map(to_external).collect())
    }

    async fn insert_event(
        &self,
        credential: &str,
        event: &MirrorEvent,
    ) -> Result<String, CalendarError> {
        let body = InsertBody {
            summary: &event.title,
            description: &event.description,
            location: &event.location,
            start: EventTime {
                date_time: Some(event.window.start().fixed_offset()),
                date: None,
            },
            end: EventTime {
                date_time: Some(event.window.end().fixed_offset()),
                date: None,
            },
            extended_properties: ExtendedProperties {
                private: encode_properties(event.event_id),
            },
        };

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(credential)
            .json(&body)
            .send()
            .await?;

        let inserted: Inserted = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| CalendarError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            event_id = event.event_id,
            external_id = %inserted.id,
            "Event mirrored to external calendar",
        );
        Ok(inserted.id)
    }
}
