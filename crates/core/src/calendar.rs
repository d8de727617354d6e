//! External calendar projections and the cross-reference marker that links a
//! mirrored calendar entry back to its platform event.
//!
//! The marker is written twice when an event is mirrored: as a private
//! extended property ([`CROSS_REF_PROPERTY`]) and as a trailing description
//! line (`gigify-event:<id>`). Either one is enough to recover the id, so
//! entries survive providers or users that drop one of the two.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::time_window::TimeWindow;
use crate::types::DbId;

/// Private extended-property key carrying the platform event id.
pub const CROSS_REF_PROPERTY: &str = "gigifyEventId";

/// Private extended-property key present on every platform-originated entry.
pub const ORIGIN_PROPERTY: &str = "appIdentifier";

/// Value stored under [`ORIGIN_PROPERTY`].
pub const ORIGIN_VALUE: &str = "gigify";

/// Prefix of the description marker line.
pub const DESCRIPTION_MARKER: &str = "gigify-event:";

static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^gigify-event:(\d+)\s*$").expect("valid regex"));

/// Whether an external entry was written by this platform or by someone else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarOrigin {
    Platform,
    Foreign,
}

/// Read-only projection of an entry in a user's external calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCalendarEvent {
    pub external_id: String,
    pub title: String,
    pub window: TimeWindow,
    pub location: Option<String>,
    pub description: Option<String>,
    pub origin: CalendarOrigin,
    /// Platform event id recovered from the marker, if any.
    pub cross_ref: Option<DbId>,
}

impl ExternalCalendarEvent {
    /// Build a projection from provider fields, classifying the origin and
    /// extracting the cross-reference.
    pub fn from_provider(
        external_id: String,
        title: String,
        window: TimeWindow,
        location: Option<String>,
        description: Option<String>,
        private_properties: &HashMap<String, String>,
    ) -> Self {
        let cross_ref = parse_cross_ref(description.as_deref(), private_properties);
        let tagged = private_properties
            .get(ORIGIN_PROPERTY)
            .is_some_and(|v| v == ORIGIN_VALUE);
        let origin = if tagged || cross_ref.is_some() {
            CalendarOrigin::Platform
        } else {
            CalendarOrigin::Foreign
        };
        Self {
            external_id,
            title,
            window,
            location,
            description,
            origin,
            cross_ref,
        }
    }
}

/// Append the marker line for `event_id` to a description.
pub fn encode_description(description: &str, event_id: DbId) -> String {
    let body = description.trim_end();
    if body.is_empty() {
        format!("{DESCRIPTION_MARKER}{event_id}")
    } else {
        format!("{body}\n\n{DESCRIPTION_MARKER}{event_id}")
    }
}

/// Private extended properties written alongside a mirrored event.
pub fn encode_properties(event_id: DbId) -> HashMap<String, String> {
    HashMap::from([
        (ORIGIN_PROPERTY.to_string(), ORIGIN_VALUE.to_string()),
        (CROSS_REF_PROPERTY.to_string(), event_id.to_string()),
    ])
}

/// Recover the platform event id, preferring the structured property.
pub fn parse_cross_ref(
    description: Option<&str>,
    private_properties: &HashMap<String, String>,
) -> Option<DbId> {
    private_properties
        .get(CROSS_REF_PROPERTY)
        .and_then(|v| v.trim().parse().ok())
        .or_else(|| {
            description
                .and_then(|d| MARKER_RE.captures_iter(d).last())
                .and_then(|c| c[1].parse().ok())
        })
}
