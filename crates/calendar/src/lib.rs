//! External calendar boundary.
//!
//! [`CalendarClient`] reads a user's upcoming calendar entries and writes
//! mirrored platform events into it. [`GoogleCalendarClient`] speaks the
//! Google Calendar v3 REST API.

pub mod google;

use gigify_core::calendar::{encode_description, ExternalCalendarEvent};
use gigify_core::event::Event;
use gigify_core::time_window::TimeWindow;
use gigify_core::types::{DbId, Timestamp};

pub use google::{GoogleCalendarClient, GoogleCalendarConfig};

/// Title prefix for entries written by the platform.
pub const MIRROR_TITLE_PREFIX: &str = "[Gigify] ";

/// Errors from a calendar provider.
#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The credential was rejected.
    #[error("Calendar credential rejected ({status})")]
    Unauthorized { status: u16 },

    /// The provider returned a non-2xx status code.
    #[error("Calendar API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The provider answered with something we could not interpret.
    #[error("Invalid calendar response: {0}")]
    InvalidResponse(String),
}

/// A platform event as written into an external calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct MirrorEvent {
    pub event_id: DbId,
    pub title: String,
    pub window: TimeWindow,
    pub location: String,
    /// Description with the cross-reference marker line already appended.
    pub description: String,
}

impl MirrorEvent {
    pub fn from_event(event: &Event) -> Self {
        Self {
            event_id: event.id,
            title: format!("{MIRROR_TITLE_PREFIX}{}", event.title),
            window: event.window,
            location: event.location.clone(),
            description: encode_description(&event.description, event.id),
        }
    }
}

/// Read and write access to a user's external calendar.
///
/// `credential` is the user's provider access token; the platform never
/// stores it.
#[async_trait::async_trait]
pub trait CalendarClient: Send + Sync {
    /// Entries ending after `time_min`, ordered by start, at most `max_results`.
    async fn list_upcoming(
        &self,
        credential: &str,
        time_min: Timestamp,
        max_results: u32,
    ) -> Result<Vec<ExternalCalendarEvent>, CalendarError>;

    /// Insert a mirrored event and return the provider's id for it.
    async fn insert_event(
        &self,
        credential: &str,
        event: &MirrorEvent,
    ) -> Result<String, CalendarError>;
}
