//! Event Registry: the authoritative store of bookable events and the
//! accept, favorite and contact edges hanging off them.

use std::sync::Arc;

use chrono::Utc;
use gigify_calendar::{CalendarClient, MirrorEvent};
use gigify_core::error::CoreError;
use gigify_core::event::{Event, EventPatch, NewEvent};
use gigify_core::store::{Contact, Favorite, ScheduleStore};
use gigify_core::types::{DbId, Timestamp, UserId};
use gigify_events::event_types::{
    EVENT_ACCEPTED, EVENT_CONTACTED, EVENT_CREATED, EVENT_DELETED, EVENT_FAVORITED, EVENT_UPDATED,
};
use gigify_events::{EventBus, NotificationPayload, PlatformEvent};
use tokio_util::task::TaskTracker;

use crate::config::EngineConfig;
use crate::geo::GeospatialIndex;

/// Longest accepted contact message, in characters.
pub const MAX_CONTACT_MESSAGE_LEN: usize = 2000;

pub struct EventRegistry {
    store: Arc<dyn ScheduleStore>,
    geo: Arc<GeospatialIndex>,
    calendar: Arc<dyn CalendarClient>,
    bus: Arc<EventBus>,
    config: EngineConfig,
    background: TaskTracker,
}

impl EventRegistry {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        geo: Arc<GeospatialIndex>,
        calendar: Arc<dyn CalendarClient>,
        bus: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            geo,
            calendar,
            bus,
            config,
            background: TaskTracker::new(),
        }
    }

    /// Validate and store a new event, then geocode its location in the
    /// background. The event is returned with unresolved coordinates.
    pub async fn create(&self, owner_id: UserId, fields: NewEvent) -> Result<Event, CoreError> {
        fields.validate_at(Utc::now())?;
        let event = self.store.insert_event(owner_id, &fields).await?;

        tracing::info!(event_id = event.id, owner_id, "Event created");
        self.spawn_geocode(event.id, event.location.clone());
        self.bus.publish(
            PlatformEvent::new(EVENT_CREATED)
                .with_source("event", event.id)
                .with_actor(owner_id),
        );
        Ok(event)
    }

    /// Owner edit. The merged event is re-validated; a new location clears
    /// the coordinates and is geocoded again.
    pub async fn update(
        &self,
        event_id: DbId,
        owner_id: UserId,
        patch: EventPatch,
    ) -> Result<Event, CoreError> {
        let current = self.owned_event(event_id, owner_id).await?;
        let relocated = patch.relocates(&current);
        let next = patch.apply_to(&current, Utc::now())?;

        let updated = self
            .store
            .update_event(&next)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "event",
                id: event_id,
            })?;

        tracing::info!(event_id, owner_id, relocated, "Event updated");
        if relocated {
            self.spawn_geocode(updated.id, updated.location.clone());
        }
        self.bus.publish(
            PlatformEvent::new(EVENT_UPDATED)
                .with_source("event", event_id)
                .with_actor(owner_id),
        );
        Ok(updated)
    }

    /// Add `user_id` to the event's accepted set. Accepting twice is a no-op
    /// and notifies the owner only once.
    pub async fn accept(&self, event_id: DbId, user_id: UserId) -> Result<Event, CoreError> {
        let event = self.get(event_id).await?;
        let added = self.store.add_acceptance(event_id, user_id).await?;
        if added {
            tracing::info!(event_id, user_id, "Event accepted");
            self.publish_notification(EVENT_ACCEPTED, &event, user_id, None);
        } else {
            tracing::debug!(event_id, user_id, "Event already accepted");
        }
        self.get(event_id).await
    }

    /// Delete an owned event along with its favorites, contacts and acceptances.
    pub async fn delete(&self, event_id: DbId, owner_id: UserId) -> Result<(), CoreError> {
        self.owned_event(event_id, owner_id).await?;
        if !self.store.delete_event_cascade(event_id).await? {
            return Err(CoreError::NotFound {
                entity: "event",
                id: event_id,
            });
        }
        tracing::info!(event_id, owner_id, "Event deleted");
        self.bus.publish(
            PlatformEvent::new(EVENT_DELETED)
                .with_source("event", event_id)
                .with_actor(owner_id),
        );
        Ok(())
    }

    /// Events ending after `as_of`, ordered by start then id.
    pub async fn upcoming(&self, as_of: Timestamp) -> Result<Vec<Event>, CoreError> {
        self.store.list_upcoming(as_of).await
    }

    pub async fn get(&self, event_id: DbId) -> Result<Event, CoreError> {
        self.store
            .get_event(event_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "event",
                id: event_id,
            })
    }

    pub async fn owned_by(&self, owner_id: UserId) -> Result<Vec<Event>, CoreError> {
        self.store.list_owned(owner_id).await
    }

    pub async fn favorite(&self, user_id: UserId, event_id: DbId) -> Result<Favorite, CoreError> {
        let event = self.get(event_id).await?;
        let (favorite, created) = self.store.add_favorite(user_id, event_id).await?;
        if created {
            tracing::info!(event_id, user_id, "Event favorited");
            self.publish_notification(EVENT_FAVORITED, &event, user_id, None);
        }
        Ok(favorite)
    }

    /// Idempotent: removing a missing favorite succeeds.
    pub async fn unfavorite(&self, user_id: UserId, event_id: DbId) -> Result<(), CoreError> {
        if self.store.remove_favorite(user_id, event_id).await? {
            tracing::info!(event_id, user_id, "Event unfavorited");
        }
        Ok(())
    }

    pub async fn favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, CoreError> {
        self.store.list_favorites(user_id).await
    }

    pub async fn contact(
        &self,
        user_id: UserId,
        event_id: DbId,
        message: Option<String>,
    ) -> Result<Contact, CoreError> {
        if let Some(text) = &message {
            if text.chars().count() > MAX_CONTACT_MESSAGE_LEN {
                return Err(CoreError::Validation(format!(
                    "Contact message must be at most {MAX_CONTACT_MESSAGE_LEN} characters"
                )));
            }
        }
        let event = self.get(event_id).await?;
        let contact = self
            .store
            .add_contact(user_id, event_id, message.as_deref())
            .await?;
        tracing::info!(event_id, user_id, contact_id = contact.id, "Event owner contacted");
        self.publish_notification(EVENT_CONTACTED, &event, user_id, message);
        Ok(contact)
    }

    pub async fn contacts(&self, user_id: UserId) -> Result<Vec<Contact>, CoreError> {
        self.store.list_contacts(user_id).await
    }

    /// Write the event into the user's external calendar with the
    /// cross-reference marker. Only the owner, an accepting user or a user who
    /// favorited the event may mirror it.
    pub async fn mirror_to_calendar(
        &self,
        event_id: DbId,
        user_id: UserId,
        credential: &str,
    ) -> Result<String, CoreError> {
        let event = self.get(event_id).await?;
        let related = event.involves(user_id)
            || self
                .store
                .list_favorites(user_id)
                .await?
                .iter()
                .any(|f| f.event_id == event_id);
        if !related {
            return Err(CoreError::Forbidden(format!(
                "user {user_id} has no relation to event {event_id}"
            )));
        }

        let mirror = MirrorEvent::from_event(&event);
        let external_id = tokio::time::timeout(
            self.config.calendar_timeout,
            self.calendar.insert_event(credential, &mirror),
        )
        .await
        .map_err(|_| {
            CoreError::Upstream(format!(
                "calendar write timed out after {:?}",
                self.config.calendar_timeout
            ))
        })?
        .map_err(|e| CoreError::Upstream(e.to_string()))?;

        Ok(external_id)
    }

    /// Wait for in-flight background geocoding to finish.
    pub async fn wait_for_background(&self) {
        self.background.close();
        self.background.wait().await;
        self.background.reopen();
    }

    // ---- private helpers ----

    async fn owned_event(&self, event_id: DbId, owner_id: UserId) -> Result<Event, CoreError> {
        let event = self.get(event_id).await?;
        if event.owner_id != owner_id {
            return Err(CoreError::NotOwner {
                entity: "event",
                id: event_id,
            });
        }
        Ok(event)
    }

    fn publish_notification(
        &self,
        event_type: &str,
        event: &Event,
        actor: UserId,
        message: Option<String>,
    ) {
        let payload = NotificationPayload {
            owner_id: event.owner_id,
            event_title: event.title.clone(),
            message,
        };
        self.bus.publish(
            PlatformEvent::new(event_type)
                .with_source("event", event.id)
                .with_actor(actor)
                .with_payload(payload.to_value()),
        );
    }

    fn spawn_geocode(&self, event_id: DbId, location: String) {
        let geo = Arc::clone(&self.geo);
        let store = Arc::clone(&self.store);
        self.background.spawn(async move {
            match geo.resolve(&location).await {
                Ok(coords) => match store.set_event_coordinates(event_id, &location, coords).await {
                    Ok(true) => {
                        tracing::debug!(event_id, lat = coords.lat, lng = coords.lng, "Event geocoded")
                    }
                    Ok(false) => {
                        tracing::debug!(event_id, "Event changed or removed before geocoding finished")
                    }
                    Err(e) => {
                        tracing::warn!(event_id, error = %e, "Failed to store event coordinates")
                    }
                },
                Err(e) => {
                    tracing::warn!(event_id, location = %location, error = %e, "Event geocoding failed");
                }
            }
        });
    }
}
