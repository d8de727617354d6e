mod common;

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use gigify_core::availability::AvailabilityWindow;
use gigify_core::error::CoreError;
use gigify_core::event::{Event, EventPatch, NewEvent};
use gigify_core::geo::Coordinates;
use gigify_core::store::{
    Contact, Favorite, NewNotification, Notification, NotificationKind, ScheduleStore,
};
use gigify_core::time_window::TimeWindow;
use gigify_core::types::{DbId, Timestamp, UserId};
use gigify_engine::MemoryStore;
use gigify_events::NotificationDispatcher;

use common::{engine_over, gig, harness, span, tomorrow_at, CalendarMode, LONDON};

#[tokio::test]
async fn created_event_is_upcoming_until_it_ends() {
    let h = harness(CalendarMode::Entries(vec![]));
    let window = span(20, 23);
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", window))
        .await
        .unwrap();

    let before = h.engine.registry.upcoming(window.start() - Duration::seconds(1)).await.unwrap();
    assert!(before.iter().any(|e| e.id == event.id));

    let after = h.engine.registry.upcoming(window.end() + Duration::seconds(1)).await.unwrap();
    assert!(after.iter().all(|e| e.id != event.id));
}

#[tokio::test]
async fn past_start_is_rejected() {
    let h = harness(CalendarMode::Entries(vec![]));
    let start = Utc::now() - Duration::hours(1);
    let window = TimeWindow::new(start, start + Duration::hours(3)).unwrap();
    let result = h.engine.registry.create(1, gig("Old", "Jazz", "London", window)).await;
    assert_matches!(result, Err(CoreError::Validation(_)));
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let h = harness(CalendarMode::Entries(vec![]));
    let result = h.engine.registry.create(1, gig("   ", "Jazz", "London", span(20, 22))).await;
    assert_matches!(result, Err(CoreError::Validation(_)));
}

#[tokio::test]
async fn location_is_geocoded_in_the_background() {
    let h = harness(CalendarMode::Entries(vec![]));
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();
    assert!(event.coordinates.is_none());

    h.engine.registry.wait_for_background().await;
    let stored = h.engine.registry.get(event.id).await.unwrap();
    assert_eq!(stored.coordinates, Some(LONDON));
}

#[tokio::test]
async fn geocode_failure_leaves_the_event_unresolved() {
    let h = harness(CalendarMode::Entries(vec![]));
    let event = h
        .engine
        .registry
        .create(1, gig("Pop-up", "Jazz", "Somewhere unknown", span(20, 23)))
        .await
        .unwrap();

    h.engine.registry.wait_for_background().await;
    assert!(h.engine.registry.get(event.id).await.unwrap().coordinates.is_none());
}

#[tokio::test]
async fn relocation_clears_and_reresolves_coordinates() {
    let h = harness(CalendarMode::Entries(vec![]));
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();
    h.engine.registry.wait_for_background().await;

    let patch = EventPatch {
        location: Some("York".into()),
        ..Default::default()
    };
    let updated = h.engine.registry.update(event.id, 1, patch).await.unwrap();
    assert_eq!(updated.location, "York");
    assert!(updated.coordinates.is_none());

    h.engine.registry.wait_for_background().await;
    let stored = h.engine.registry.get(event.id).await.unwrap();
    assert_eq!(stored.coordinates, Some(common::YORK));
}

/// Holds every `update_event` until the target event has coordinates, so an
/// edit read before geocoding is written after it.
struct UpdateAfterGeocode(MemoryStore);

#[async_trait::async_trait]
impl ScheduleStore for UpdateAfterGeocode {
    async fn insert_event(&self, owner_id: UserId, fields: &NewEvent) -> Result<Event, CoreError> {
        self.0.insert_event(owner_id, fields).await
    }

    async fn get_event(&self, id: DbId) -> Result<Option<Event>, CoreError> {
        self.0.get_event(id).await
    }

    async fn update_event(&self, event: &Event) -> Result<Option<Event>, CoreError> {
        tokio::time::timeout(StdDuration::from_secs(2), async {
            while self.0.get_event(event.id).await?.and_then(|e| e.coordinates).is_none() {
                tokio::time::sleep(StdDuration::from_millis(5)).await;
            }
            Ok::<_, CoreError>(())
        })
        .await
        .expect("geocoding never stored coordinates")?;
        self.0.update_event(event).await
    }

    async fn set_event_coordinates(
        &self,
        id: DbId,
        location: &str,
        coordinates: Coordinates,
    ) -> Result<bool, CoreError> {
        self.0.set_event_coordinates(id, location, coordinates).await
    }

    async fn delete_event_cascade(&self, id: DbId) -> Result<bool, CoreError> {
        self.0.delete_event_cascade(id).await
    }

    async fn add_acceptance(&self, event_id: DbId, user_id: UserId) -> Result<bool, CoreError> {
        self.0.add_acceptance(event_id, user_id).await
    }

    async fn list_upcoming(&self, as_of: Timestamp) -> Result<Vec<Event>, CoreError> {
        self.0.list_upcoming(as_of).await
    }

    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Event>, CoreError> {
        self.0.list_owned(owner_id).await
    }

    async fn list_accepted(&self, user_id: UserId) -> Result<Vec<Event>, CoreError> {
        self.0.list_accepted(user_id).await
    }

    async fn list_availability(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<AvailabilityWindow>, CoreError> {
        self.0.list_availability(owner_id).await
    }

    async fn replace_availability(
        &self,
        owner_id: UserId,
        window: TimeWindow,
        label: &str,
        supersede: &[DbId],
    ) -> Result<AvailabilityWindow, CoreError> {
        self.0.replace_availability(owner_id, window, label, supersede).await
    }

    async fn delete_availability(&self, owner_id: UserId, id: DbId) -> Result<bool, CoreError> {
        self.0.delete_availability(owner_id, id).await
    }

    async fn add_favorite(
        &self,
        user_id: UserId,
        event_id: DbId,
    ) -> Result<(Favorite, bool), CoreError> {
        self.0.add_favorite(user_id, event_id).await
    }

    async fn remove_favorite(&self, user_id: UserId, event_id: DbId) -> Result<bool, CoreError> {
        self.0.remove_favorite(user_id, event_id).await
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, CoreError> {
        self.0.list_favorites(user_id).await
    }

    async fn add_contact(
        &self,
        user_id: UserId,
        event_id: DbId,
        message: Option<&str>,
    ) -> Result<Contact, CoreError> {
        self.0.add_contact(user_id, event_id, message).await
    }

    async fn list_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, CoreError> {
        self.0.list_contacts(user_id).await
    }

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, CoreError> {
        self.0.create_notification(notification).await
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, CoreError> {
        self.0.list_notifications(user_id, unread_only).await
    }

    async fn mark_notification_read(&self, user_id: UserId, id: DbId) -> Result<bool, CoreError> {
        self.0.mark_notification_read(user_id, id).await
    }

    async fn user_email(&self, user_id: UserId) -> Result<Option<String>, CoreError> {
        self.0.user_email(user_id).await
    }
}

#[tokio::test]
async fn edit_racing_geocoding_keeps_coordinates() {
    let engine = engine_over(Arc::new(UpdateAfterGeocode(MemoryStore::new())));
    let event = engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();
    assert!(event.coordinates.is_none());

    let patch = EventPatch {
        capacity: Some(60),
        ..Default::default()
    };
    let updated = engine.registry.update(event.id, 1, patch).await.unwrap();
    assert_eq!(updated.capacity, 60);

    engine.registry.wait_for_background().await;
    let stored = engine.registry.get(event.id).await.unwrap();
    assert_eq!(stored.coordinates, Some(LONDON));
    assert_eq!(stored.capacity, 60);
}

#[tokio::test]
async fn only_the_owner_may_edit_or_delete() {
    let h = harness(CalendarMode::Entries(vec![]));
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();

    let patch = EventPatch {
        capacity: Some(10),
        ..Default::default()
    };
    assert_matches!(
        h.engine.registry.update(event.id, 2, patch).await,
        Err(CoreError::NotOwner { .. })
    );
    assert_matches!(
        h.engine.registry.delete(event.id, 2).await,
        Err(CoreError::NotOwner { .. })
    );
    assert_matches!(
        h.engine.registry.delete(999, 1).await,
        Err(CoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn double_accept_keeps_one_entry_and_notifies_once() {
    let h = harness(CalendarMode::Entries(vec![]));
    let mut rx = h.bus.subscribe();
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();

    h.engine.registry.accept(event.id, 2).await.unwrap();
    let accepted = h.engine.registry.accept(event.id, 2).await.unwrap();
    assert_eq!(accepted.accepted_by, BTreeSet::from([2]));

    let dispatcher = NotificationDispatcher::new(h.store.clone(), None);
    while let Ok(published) = rx.try_recv() {
        dispatcher.handle(&published).await;
    }

    let notifications = h.store.list_notifications(1, false).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Accepted);
    assert_eq!(notifications[0].actor_id, Some(2));
}

#[tokio::test]
async fn accepting_unknown_event_is_not_found() {
    let h = harness(CalendarMode::Entries(vec![]));
    assert_matches!(
        h.engine.registry.accept(42, 2).await,
        Err(CoreError::NotFound { entity: "event", id: 42 })
    );
}

#[tokio::test]
async fn delete_cascades_to_favorites_and_contacts() {
    let h = harness(CalendarMode::Entries(vec![]));
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();

    h.engine.registry.favorite(2, event.id).await.unwrap();
    h.engine.registry.contact(2, event.id, Some("Still booking?".into())).await.unwrap();
    h.engine.registry.accept(event.id, 3).await.unwrap();

    h.engine.registry.delete(event.id, 1).await.unwrap();

    assert!(h.engine.registry.favorites(2).await.unwrap().is_empty());
    assert!(h.engine.registry.contacts(2).await.unwrap().is_empty());
    assert!(h.store.list_accepted(3).await.unwrap().is_empty());
    assert_matches!(h.engine.registry.get(event.id).await, Err(CoreError::NotFound { .. }));
}

#[tokio::test]
async fn delete_keeps_notifications_but_detaches_them() {
    let h = harness(CalendarMode::Entries(vec![]));
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();
    h.store
        .create_notification(&NewNotification {
            recipient_id: 1,
            kind: NotificationKind::Favorited,
            event_id: Some(event.id),
            actor_id: Some(2),
            message: "User 2 favorited your event".into(),
        })
        .await
        .unwrap();

    h.engine.registry.delete(event.id, 1).await.unwrap();

    let notifications = h.store.list_notifications(1, false).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].event_id, None);
}

#[tokio::test]
async fn favorite_is_idempotent_and_unfavorite_tolerates_missing() {
    let h = harness(CalendarMode::Entries(vec![]));
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();

    h.engine.registry.favorite(2, event.id).await.unwrap();
    h.engine.registry.favorite(2, event.id).await.unwrap();
    assert_eq!(h.engine.registry.favorites(2).await.unwrap().len(), 1);

    h.engine.registry.unfavorite(2, event.id).await.unwrap();
    h.engine.registry.unfavorite(2, event.id).await.unwrap();
    assert!(h.engine.registry.favorites(2).await.unwrap().is_empty());
}

#[tokio::test]
async fn mirror_requires_a_relation_to_the_event() {
    let h = harness(CalendarMode::Entries(vec![]));
    let event = h
        .engine
        .registry
        .create(1, gig("Late set", "Jazz", "London", span(20, 23)))
        .await
        .unwrap();

    assert_matches!(
        h.engine.registry.mirror_to_calendar(event.id, 5, "token").await,
        Err(CoreError::Forbidden(_))
    );

    h.engine.registry.favorite(5, event.id).await.unwrap();
    let external_id = h.engine.registry.mirror_to_calendar(event.id, 5, "token").await.unwrap();
    assert_eq!(external_id, "ext-1");

    let inserted = h.calendar.inserted.lock().unwrap();
    assert_eq!(inserted[0].event_id, event.id);
    assert!(inserted[0].description.ends_with(&format!("gigify-event:{}", event.id)));
}

#[tokio::test]
async fn owned_by_lists_in_start_order() {
    let h = harness(CalendarMode::Entries(vec![]));
    let late = TimeWindow::new(tomorrow_at(20, 1), tomorrow_at(22, 1)).unwrap();
    h.engine.registry.create(1, gig("Second", "Jazz", "London", late)).await.unwrap();
    h.engine.registry.create(1, gig("First", "Jazz", "London", span(20, 22))).await.unwrap();
    h.engine.registry.create(2, gig("Other", "Jazz", "London", span(20, 22))).await.unwrap();

    let titles: Vec<_> = h
        .engine
        .registry
        .owned_by(1)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.title)
        .collect();
    assert_eq!(titles, vec!["First", "Second"]);
}
