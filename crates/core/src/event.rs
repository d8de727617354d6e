//! Bookable events: the domain type, creation/update DTOs and their rules.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::geo::Coordinates;
use crate::time_window::TimeWindow;
use crate::types::{DbId, Timestamp, UserId};

/// A bookable, time-bounded listing created by a musician or venue.
///
/// `coordinates` is `None` until asynchronous geocoding of `location`
/// succeeds. Such an event is listed normally but is never returned by a
/// distance-filtered search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: DbId,
    pub owner_id: UserId,
    pub title: String,
    pub genre: String,
    pub description: String,
    pub window: TimeWindow,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub capacity: i32,
    pub accepted_by: BTreeSet<UserId>,
    pub photo_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    /// The user owns the event or is on its `accepted_by` list.
    pub fn involves(&self, user_id: UserId) -> bool {
        self.owner_id == user_id || self.accepted_by.contains(&user_id)
    }
}

/// Fields supplied when creating an event.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewEvent {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 80))]
    pub genre: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    pub window: TimeWindow,
    #[validate(length(max = 500))]
    pub location: String,
    #[validate(range(min = 0))]
    pub capacity: i32,
    pub photo_ref: Option<String>,
}

impl NewEvent {
    /// Shape, range and temporal validation. `now` is injected so callers and
    /// tests control the clock.
    pub fn validate_at(&self, now: Timestamp) -> Result<(), CoreError> {
        self.validate()?;
        if self.title.trim().is_empty() {
            return Err(CoreError::Validation("Event title must not be blank".into()));
        }
        if self.genre.trim().is_empty() {
            return Err(CoreError::Validation("Event genre must not be blank".into()));
        }
        if self.window.start() < now {
            return Err(CoreError::Validation(format!(
                "Event start {} is in the past",
                self.window.start()
            )));
        }
        Ok(())
    }
}

/// Owner edit of an event. Absent fields are left unchanged.
///
/// `accepted_by` is deliberately absent: acceptance goes through the
/// separate accept operation.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EventPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 80))]
    pub genre: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    pub window: Option<TimeWindow>,
    #[validate(length(max = 500))]
    pub location: Option<String>,
    #[validate(range(min = 0))]
    pub capacity: Option<i32>,
    /// Absent leaves the photo as is; `null` removes it.
    #[serde(default, deserialize_with = "present")]
    pub photo_ref: Option<Option<String>>,
}

/// A field that is present in the input, `null` included, becomes `Some`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl EventPatch {
    /// Apply the patch to a copy of `current`, re-validating the merged result.
    ///
    /// A moved start must not be in the past. A changed location clears the
    /// coordinates so they are re-resolved.
    pub fn apply_to(&self, current: &Event, now: Timestamp) -> Result<Event, CoreError> {
        self.validate()?;

        let mut next = current.clone();
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(CoreError::Validation("Event title must not be blank".into()));
            }
            next.title = title.clone();
        }
        if let Some(genre) = &self.genre {
            if genre.trim().is_empty() {
                return Err(CoreError::Validation("Event genre must not be blank".into()));
            }
            next.genre = genre.clone();
        }
        if let Some(description) = &self.description {
            next.description = description.clone();
        }
        if let Some(window) = self.window {
            if window.start() != current.window.start() && window.start() < now {
                return Err(CoreError::Validation(format!(
                    "Event start {} is in the past",
                    window.start()
                )));
            }
            next.window = window;
        }
        if let Some(location) = &self.location {
            if *location != current.location {
                next.location = location.clone();
                next.coordinates = None;
            }
        }
        if let Some(capacity) = self.capacity {
            next.capacity = capacity;
        }
        if let Some(photo_ref) = &self.photo_ref {
            next.photo_ref = photo_ref.clone();
        }
        next.updated_at = now;
        Ok(next)
    }

    /// True when applying the patch changes the geocodable location.
    pub fn relocates(&self, current: &Event) -> bool {
        self.location
            .as_ref()
            .is_some_and(|location| *location != current.location)
    }
}

/// Upcoming-events rule: still running or not yet started at `as_of`.
pub fn is_upcoming(event: &Event, as_of: Timestamp) -> bool {
    event.window.end() > as_of
}

/// Order events by start ascending, ties broken by id.
pub fn sort_by_start(events: &mut [Event]) {
    events.sort_by(|a, b| {
        a.window
            .start()
            .cmp(&b.window.start())
            .then(a.id.cmp(&b.id))
    });
}


#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::test_support::event;
    use super::*;
    use crate::time_window::test_support::{at, window};

    fn new_event() -> NewEvent {
        NewEvent {
            title: "Friday Night Rock".into(),
            genre: "Rock".into(),
            description: String::new(),
            window: window((20, 0), (23, 0)),
            location: "London".into(),
            capacity: 50,
            photo_ref: None,
        }
    }

    #[test]
    fn valid_event_passes() {
        assert!(new_event().validate_at(at(12, 0)).is_ok());
    }

    #[test]
    fn start_in_the_past_is_rejected() {
        assert_matches!(new_event().validate_at(at(21, 0)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn start_exactly_now_is_accepted() {
        assert!(new_event().validate_at(at(20, 0)).is_ok());
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let mut fields = new_event();
        fields.capacity = -1;
        assert_matches!(fields.validate_at(at(12, 0)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut fields = new_event();
        fields.title = "   ".into();
        assert_matches!(fields.validate_at(at(12, 0)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn patch_changes_only_given_fields() {
        let current = event(1, 7, window((20, 0), (23, 0)));
        let patch = EventPatch {
            capacity: Some(120),
            ..Default::default()
        };
        let next = patch.apply_to(&current, at(12, 0)).unwrap();
        assert_eq!(next.capacity, 120);
        assert_eq!(next.title, current.title);
        assert_eq!(next.window, current.window);
    }

    #[test]
    fn patch_null_photo_clears_it() {
        let mut current = event(1, 7, window((20, 0), (23, 0)));
        current.photo_ref = Some("posters/1.jpg".into());

        let untouched: EventPatch = serde_json::from_str(r#"{"capacity": 10}"#).unwrap();
        assert_eq!(untouched.photo_ref, None);
        let next = untouched.apply_to(&current, at(12, 0)).unwrap();
        assert_eq!(next.photo_ref.as_deref(), Some("posters/1.jpg"));

        let cleared: EventPatch = serde_json::from_str(r#"{"photo_ref": null}"#).unwrap();
        assert_eq!(cleared.photo_ref, Some(None));
        assert_eq!(cleared.apply_to(&current, at(12, 0)).unwrap().photo_ref, None);
    }

    #[test]
    fn patch_relocation_clears_coordinates() {
        let mut current = event(1, 7, window((20, 0), (23, 0)));
        current.coordinates = Some(Coordinates { lat: 51.5, lng: -0.12 });
        let patch = EventPatch {
            location: Some("Bristol".into()),
            ..Default::default()
        };
        assert!(patch.relocates(&current));
        let next = patch.apply_to(&current, at(12, 0)).unwrap();
        assert_eq!(next.location, "Bristol");
        assert!(next.coordinates.is_none());
    }

    #[test]
    fn patch_cannot_move_start_into_the_past() {
        let current = event(1, 7, window((20, 0), (23, 0)));
        let patch = EventPatch {
            window: Some(window((9, 0), (10, 0))),
            ..Default::default()
        };
        assert_matches!(patch.apply_to(&current, at(12, 0)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn patch_can_extend_end_of_running_event() {
        let current = event(1, 7, window((20, 0), (22, 0)));
        let patch = EventPatch {
            window: Some(window((20, 0), (23, 30))),
            ..Default::default()
        };
        let next = patch.apply_to(&current, at(21, 0)).unwrap();
        assert_eq!(next.window, window((20, 0), (23, 30)));
    }

    #[test]
    fn upcoming_uses_window_end() {
        let e = event(1, 7, window((20, 0), (23, 0)));
        assert!(is_upcoming(&e, at(19, 59)));
        assert!(is_upcoming(&e, at(22, 59)));
        assert!(!is_upcoming(&e, at(23, 0)));
    }
}
