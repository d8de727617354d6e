//! PgStore against a real database.

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use gigify_core::error::CoreError;
use gigify_core::event::NewEvent;
use gigify_core::geo::Coordinates;
use gigify_core::store::{NewNotification, NotificationKind, ScheduleStore};
use gigify_core::time_window::TimeWindow;
use gigify_db::repositories::UserRepo;
use gigify_db::PgStore;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hours_from_now(from: i64, to: i64) -> TimeWindow {
    let base = Utc::now();
    TimeWindow::new(base + Duration::hours(from), base + Duration::hours(to)).unwrap()
}

fn new_event(title: &str, window: TimeWindow) -> NewEvent {
    NewEvent {
        title: title.into(),
        genre: "Jazz".into(),
        description: "Two sets".into(),
        window,
        location: "London".into(),
        capacity: 120,
        photo_ref: None,
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_insert_and_fetch_event(pool: PgPool) {
    let store = PgStore::new(pool);
    let created = store
        .insert_event(1, &new_event("Late set", hours_from_now(24, 27)))
        .await
        .unwrap();

    let fetched = store.get_event(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.title, "Late set");
    assert_eq!(fetched.owner_id, 1);
    assert!(fetched.coordinates.is_none());
    assert!(fetched.accepted_by.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_upcoming_boundaries(pool: PgPool) {
    let store = PgStore::new(pool);
    let window = hours_from_now(24, 27);
    let event = store.insert_event(1, &new_event("Late set", window)).await.unwrap();

    let before = store.list_upcoming(window.start() - Duration::seconds(1)).await.unwrap();
    assert!(before.iter().any(|e| e.id == event.id));

    let after = store.list_upcoming(window.end() + Duration::seconds(1)).await.unwrap();
    assert!(after.iter().all(|e| e.id != event.id));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_acceptance_is_a_set(pool: PgPool) {
    let store = PgStore::new(pool);
    let event = store
        .insert_event(1, &new_event("Late set", hours_from_now(24, 27)))
        .await
        .unwrap();

    assert!(store.add_acceptance(event.id, 2).await.unwrap());
    assert!(!store.add_acceptance(event.id, 2).await.unwrap());

    let fetched = store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(fetched.accepted_by.into_iter().collect::<Vec<_>>(), vec![2]);
    assert_eq!(store.list_accepted(2).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_accepting_missing_event_is_not_found(pool: PgPool) {
    let store = PgStore::new(pool);
    assert_matches!(
        store.add_acceptance(404, 2).await,
        Err(CoreError::NotFound { entity: "event", id: 404 })
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn test_coordinates_ignored_after_relocation(pool: PgPool) {
    let store = PgStore::new(pool);
    let event = store
        .insert_event(1, &new_event("Late set", hours_from_now(24, 27)))
        .await
        .unwrap();
    let coords = Coordinates { lat: 51.5074, lng: -0.1278 };

    assert!(!store.set_event_coordinates(event.id, "York", coords).await.unwrap());
    assert!(store.set_event_coordinates(event.id, "London", coords).await.unwrap());
    let fetched = store.get_event(event.id).await.unwrap().unwrap();
    assert_eq!(fetched.coordinates, Some(coords));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_cascade_delete(pool: PgPool) {
    let store = PgStore::new(pool);
    let event = store
        .insert_event(1, &new_event("Late set", hours_from_now(24, 27)))
        .await
        .unwrap();
    store.add_favorite(2, event.id).await.unwrap();
    store.add_contact(2, event.id, Some("hello")).await.unwrap();
    store.add_acceptance(event.id, 3).await.unwrap();

    assert!(store.delete_event_cascade(event.id).await.unwrap());
    assert!(store.list_favorites(2).await.unwrap().is_empty());
    assert!(store.list_contacts(2).await.unwrap().is_empty());
    assert!(store.list_accepted(3).await.unwrap().is_empty());
    assert!(!store.delete_event_cascade(event.id).await.unwrap());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_keeps_acceptances(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut event = store
        .insert_event(1, &new_event("Late set", hours_from_now(24, 27)))
        .await
        .unwrap();
    store.add_acceptance(event.id, 2).await.unwrap();

    event.capacity = 80;
    let updated = store.update_event(&event).await.unwrap().unwrap();
    assert_eq!(updated.capacity, 80);
    assert!(updated.accepted_by.contains(&2));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_update_from_stale_copy_keeps_coordinates(pool: PgPool) {
    let store = PgStore::new(pool);
    let mut stale = store
        .insert_event(1, &new_event("Late set", hours_from_now(24, 27)))
        .await
        .unwrap();
    let coords = Coordinates { lat: 51.5074, lng: -0.1278 };
    store.set_event_coordinates(stale.id, "London", coords).await.unwrap();

    stale.capacity = 60;
    let updated = store.update_event(&stale).await.unwrap().unwrap();
    assert_eq!(updated.coordinates, Some(coords));

    stale.location = "York".into();
    let moved = store.update_event(&stale).await.unwrap().unwrap();
    assert_eq!(moved.coordinates, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_detaches_notifications(pool: PgPool) {
    let store = PgStore::new(pool);
    let event = store
        .insert_event(1, &new_event("Late set", hours_from_now(24, 27)))
        .await
        .unwrap();
    store
        .create_notification(&NewNotification {
            recipient_id: 1,
            kind: NotificationKind::Favorited,
            event_id: Some(event.id),
            actor_id: Some(2),
            message: "User 2 favorited your event".into(),
        })
        .await
        .unwrap();

    assert!(store.delete_event_cascade(event.id).await.unwrap());
    let notifications = store.list_notifications(1, false).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].event_id, None);
}

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_replace_supersedes_atomically(pool: PgPool) {
    let store = PgStore::new(pool);
    let inner = store
        .replace_availability(1, hours_from_now(25, 26), "short", &[])
        .await
        .unwrap();
    let outer = store
        .replace_availability(1, hours_from_now(24, 28), "long", &[inner.id])
        .await
        .unwrap();

    let windows = store.list_availability(1).await.unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].id, outer.id);
    assert_eq!(windows[0].created_by, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_delete_availability_checks_owner(pool: PgPool) {
    let store = PgStore::new(pool);
    let w = store
        .replace_availability(1, hours_from_now(25, 26), "", &[])
        .await
        .unwrap();
    assert!(!store.delete_availability(2, w.id).await.unwrap());
    assert!(store.delete_availability(1, w.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Edges & notifications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn test_favorite_is_idempotent(pool: PgPool) {
    let store = PgStore::new(pool);
    let event = store
        .insert_event(1, &new_event("Late set", hours_from_now(24, 27)))
        .await
        .unwrap();

    let (first, created) = store.add_favorite(2, event.id).await.unwrap();
    assert!(created);
    let (second, created) = store.add_favorite(2, event.id).await.unwrap();
    assert!(!created);
    assert_eq!(first, second);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_notifications_round_trip(pool: PgPool) {
    UserRepo::upsert(&pool, 1, Some("owner@example.com"), Some("Owner"))
        .await
        .unwrap();
    let store = PgStore::new(pool);

    let n = store
        .create_notification(&NewNotification {
            recipient_id: 1,
            kind: NotificationKind::Contacted,
            event_id: None,
            actor_id: Some(2),
            message: "User 2 contacted you".into(),
        })
        .await
        .unwrap();
    assert_eq!(n.kind, NotificationKind::Contacted);

    assert_eq!(store.list_notifications(1, true).await.unwrap().len(), 1);
    assert!(store.mark_notification_read(1, n.id).await.unwrap());
    assert!(store.list_notifications(1, true).await.unwrap().is_empty());

    assert_eq!(
        store.user_email(1).await.unwrap().as_deref(),
        Some("owner@example.com")
    );
    assert_eq!(store.user_email(99).await.unwrap(), None);
}
