//! In-process [`ScheduleStore`] for tests and the `memory` store backend.
//!
//! All state sits behind one `tokio::sync::RwLock`; every mutating method
//! runs in a single write-lock critical section, which makes acceptance,
//! supersede and cascade delete atomic.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use gigify_core::availability::AvailabilityWindow;
use gigify_core::error::CoreError;
use gigify_core::event::{is_upcoming, sort_by_start, Event, NewEvent};
use gigify_core::geo::Coordinates;
use gigify_core::store::{Contact, Favorite, NewNotification, Notification, ScheduleStore};
use gigify_core::time_window::TimeWindow;
use gigify_core::types::{DbId, Timestamp, UserId};
use tokio::sync::RwLock;

#[derive(Default)]
struct Inner {
    next_id: DbId,
    events: BTreeMap<DbId, Event>,
    availability: BTreeMap<DbId, AvailabilityWindow>,
    favorites: BTreeMap<(UserId, DbId), Favorite>,
    contacts: BTreeMap<DbId, Contact>,
    notifications: BTreeMap<DbId, Notification>,
    emails: HashMap<UserId, String>,
}

impl Inner {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn sorted_events<F: Fn(&Event) -> bool>(&self, keep: F) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.values().filter(|e| keep(e)).cloned().collect();
        sort_by_start(&mut events);
        events
    }
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contact address used for notification email.
    pub async fn set_user_email(&self, user_id: UserId, email: impl Into<String>) {
        self.inner.write().await.emails.insert(user_id, email.into());
    }
}

#[async_trait::async_trait]
impl ScheduleStore for MemoryStore {
    async fn insert_event(&self, owner_id: UserId, fields: &NewEvent) -> Result<Event, CoreError> {
        let mut inner = self.inner.write().await;
        let now = Utc::now();
        let event = Event {
            id: inner.next_id(),
            owner_id,
            title: fields.title.clone(),
            genre: fields.genre.clone(),
            description: fields.description.clone(),
            window: fields.window,
            location: fields.location.clone(),
            coordinates: None,
            capacity: fields.capacity,
            accepted_by: Default::default(),
            photo_ref: fields.photo_ref.clone(),
            created_at: now,
            updated_at: now,
        };
        inner.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: DbId) -> Result<Option<Event>, CoreError> {
        Ok(self.inner.read().await.events.get(&id).cloned())
    }

    async fn update_event(&self, event: &Event) -> Result<Option<Event>, CoreError> {
        let mut inner = self.inner.write().await;
        let Some(stored) = inner.events.get_mut(&event.id) else {
            return Ok(None);
        };
        // Acceptances are owned by `add_acceptance` and coordinates by
        // `set_event_coordinates`; keep the stored values.
        let accepted_by = std::mem::take(&mut stored.accepted_by);
        let coordinates = if stored.location == event.location {
            stored.coordinates
        } else {
            None
        };
        *stored = Event {
            accepted_by,
            coordinates,
            ..event.clone()
        };
        Ok(Some(stored.clone()))
    }

    async fn set_event_coordinates(
        &self,
        id: DbId,
        location: &str,
        coordinates: Coordinates,
    ) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().await;
        match inner.events.get_mut(&id) {
            Some(event) if event.location == location => {
                event.coordinates = Some(coordinates);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_event_cascade(&self, id: DbId) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().await;
        if inner.events.remove(&id).is_none() {
            return Ok(false);
        }
        inner.favorites.retain(|(_, event_id), _| *event_id != id);
        inner.contacts.retain(|_, c| c.event_id != id);
        for notification in inner.notifications.values_mut() {
            if notification.event_id == Some(id) {
                notification.event_id = None;
            }
        }
        Ok(true)
    }

    async fn add_acceptance(&self, event_id: DbId, user_id: UserId) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().await;
        let event = inner.events.get_mut(&event_id).ok_or(CoreError::NotFound {
            entity: "event",
            id: event_id,
        })?;
        Ok(event.accepted_by.insert(user_id))
    }

    async fn list_upcoming(&self, as_of: Timestamp) -> Result<Vec<Event>, CoreError> {
        Ok(self.inner.read().await.sorted_events(|e| is_upcoming(e, as_of)))
    }

    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Event>, CoreError> {
        Ok(self.inner.read().await.sorted_events(|e| e.owner_id == owner_id))
    }

    async fn list_accepted(&self, user_id: UserId) -> Result<Vec<Event>, CoreError> {
        Ok(self
            .inner
            .read()
            .await
            .sorted_events(|e| e.accepted_by.contains(&user_id)))
    }

    async fn list_availability(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<AvailabilityWindow>, CoreError> {
        let inner = self.inner.read().await;
        let mut windows: Vec<_> = inner
            .availability
            .values()
            .filter(|w| w.owner_id == owner_id)
            .cloned()
            .collect();
        windows.sort_by(|a, b| a.window.cmp(&b.window).then(a.id.cmp(&b.id)));
        Ok(windows)
    }

    async fn replace_availability(
        &self,
        owner_id: UserId,
        window: TimeWindow,
        label: &str,
        supersede: &[DbId],
    ) -> Result<AvailabilityWindow, CoreError> {
        let mut inner = self.inner.write().await;
        inner
            .availability
            .retain(|id, w| !(w.owner_id == owner_id && supersede.contains(id)));
        let created = AvailabilityWindow {
            id: inner.next_id(),
            owner_id,
            window,
            label: label.to_string(),
            created_by: owner_id,
            created_at: Utc::now(),
        };
        inner.availability.insert(created.id, created.clone());
        Ok(created)
    }

    async fn delete_availability(&self, owner_id: UserId, id: DbId) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().await;
        match inner.availability.get(&id) {
            Some(w) if w.owner_id == owner_id => {
                inner.availability.remove(&id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn add_favorite(
        &self,
        user_id: UserId,
        event_id: DbId,
    ) -> Result<(Favorite, bool), CoreError> {
        let mut inner = self.inner.write().await;
        if !inner.events.contains_key(&event_id) {
            return Err(CoreError::NotFound {
                entity: "event",
                id: event_id,
            });
        }
        if let Some(existing) = inner.favorites.get(&(user_id, event_id)) {
            return Ok((existing.clone(), false));
        }
        let favorite = Favorite {
            user_id,
            event_id,
            created_at: Utc::now(),
        };
        inner.favorites.insert((user_id, event_id), favorite.clone());
        Ok((favorite, true))
    }

    async fn remove_favorite(&self, user_id: UserId, event_id: DbId) -> Result<bool, CoreError> {
        Ok(self
            .inner
            .write()
            .await
            .favorites
            .remove(&(user_id, event_id))
            .is_some())
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .favorites
            .range((user_id, DbId::MIN)..=(user_id, DbId::MAX))
            .map(|(_, f)| f.clone())
            .collect())
    }

    async fn add_contact(
        &self,
        user_id: UserId,
        event_id: DbId,
        message: Option<&str>,
    ) -> Result<Contact, CoreError> {
        let mut inner = self.inner.write().await;
        if !inner.events.contains_key(&event_id) {
            return Err(CoreError::NotFound {
                entity: "event",
                id: event_id,
            });
        }
        let contact = Contact {
            id: inner.next_id(),
            user_id,
            event_id,
            message: message.map(String::from),
            created_at: Utc::now(),
        };
        inner.contacts.insert(contact.id, contact.clone());
        Ok(contact)
    }

    async fn list_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, CoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .contacts
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, CoreError> {
        let mut inner = self.inner.write().await;
        let stored = Notification {
            id: inner.next_id(),
            recipient_id: notification.recipient_id,
            kind: notification.kind,
            event_id: notification.event_id,
            actor_id: notification.actor_id,
            message: notification.message.clone(),
            is_read: false,
            created_at: Utc::now(),
        };
        inner.notifications.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, CoreError> {
        let inner = self.inner.read().await;
        // Newest first.
        Ok(inner
            .notifications
            .values()
            .rev()
            .filter(|n| n.recipient_id == user_id && (!unread_only || !n.is_read))
            .cloned()
            .collect())
    }

    async fn mark_notification_read(&self, user_id: UserId, id: DbId) -> Result<bool, CoreError> {
        let mut inner = self.inner.write().await;
        match inner.notifications.get_mut(&id) {
            Some(n) if n.recipient_id == user_id => {
                n.is_read = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn user_email(&self, user_id: UserId) -> Result<Option<String>, CoreError> {
        Ok(self.inner.read().await.emails.get(&user_id).cloned())
    }
}
