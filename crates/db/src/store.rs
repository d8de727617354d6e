//! [`ScheduleStore`] over PostgreSQL.

use gigify_core::availability::AvailabilityWindow;
use gigify_core::error::CoreError;
use gigify_core::event::{Event, NewEvent};
use gigify_core::geo::Coordinates;
use gigify_core::store::{Contact, Favorite, NewNotification, Notification, ScheduleStore};
use gigify_core::time_window::TimeWindow;
use gigify_core::types::{DbId, Timestamp, UserId};

use crate::models::event::EventRow;
use crate::repositories::{
    AvailabilityRepo, ContactRepo, EventRepo, FavoriteRepo, NotificationRepo, UserRepo,
};
use crate::DbPool;

/// Postgres-backed store. Cheap to clone (the pool is reference counted).
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn storage(e: sqlx::Error) -> CoreError {
    tracing::error!(error = %e, "Database error");
    CoreError::Storage(e.to_string())
}

/// Foreign-key violations on edge tables mean the event is gone.
fn missing_event_or_storage(e: sqlx::Error, event_id: DbId) -> CoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => CoreError::NotFound {
            entity: "event",
            id: event_id,
        },
        _ => storage(e),
    }
}

fn events(rows: Vec<EventRow>) -> Result<Vec<Event>, CoreError> {
    rows.into_iter().map(Event::try_from).collect()
}

#[async_trait::async_trait]
impl ScheduleStore for PgStore {
    async fn insert_event(&self, owner_id: UserId, fields: &NewEvent) -> Result<Event, CoreError> {
        let id = EventRepo::insert(&self.pool, owner_id, fields)
            .await
            .map_err(storage)?;
        self.get_event(id)
            .await?
            .ok_or_else(|| CoreError::Internal(format!("event {id} vanished after insert")))
    }

    async fn get_event(&self, id: DbId) -> Result<Option<Event>, CoreError> {
        EventRepo::find_by_id(&self.pool, id)
            .await
            .map_err(storage)?
            .map(Event::try_from)
            .transpose()
    }

    async fn update_event(&self, event: &Event) -> Result<Option<Event>, CoreError> {
        if !EventRepo::update(&self.pool, event).await.map_err(storage)? {
            return Ok(None);
        }
        self.get_event(event.id).await
    }

    async fn set_event_coordinates(
        &self,
        id: DbId,
        location: &str,
        coordinates: Coordinates,
    ) -> Result<bool, CoreError> {
        EventRepo::set_coordinates(&self.pool, id, location, coordinates)
            .await
            .map_err(storage)
    }

    async fn delete_event_cascade(&self, id: DbId) -> Result<bool, CoreError> {
        EventRepo::delete(&self.pool, id).await.map_err(storage)
    }

    async fn add_acceptance(&self, event_id: DbId, user_id: UserId) -> Result<bool, CoreError> {
        EventRepo::add_acceptance(&self.pool, event_id, user_id)
            .await
            .map_err(|e| missing_event_or_storage(e, event_id))
    }

    async fn list_upcoming(&self, as_of: Timestamp) -> Result<Vec<Event>, CoreError> {
        events(EventRepo::list_upcoming(&self.pool, as_of).await.map_err(storage)?)
    }

    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Event>, CoreError> {
        events(EventRepo::list_by_owner(&self.pool, owner_id).await.map_err(storage)?)
    }

    async fn list_accepted(&self, user_id: UserId) -> Result<Vec<Event>, CoreError> {
        events(EventRepo::list_accepted_by(&self.pool, user_id).await.map_err(storage)?)
    }

    async fn list_availability(
        &self,
        owner_id: UserId,
    ) -> Result<Vec<AvailabilityWindow>, CoreError> {
        AvailabilityRepo::list_by_owner(&self.pool, owner_id)
            .await
            .map_err(storage)?
            .into_iter()
            .map(AvailabilityWindow::try_from)
            .collect()
    }

    async fn replace_availability(
        &self,
        owner_id: UserId,
        window: TimeWindow,
        label: &str,
        supersede: &[DbId],
    ) -> Result<AvailabilityWindow, CoreError> {
        AvailabilityRepo::replace(&self.pool, owner_id, &window, label, supersede)
            .await
            .map_err(storage)?
            .try_into()
    }

    async fn delete_availability(&self, owner_id: UserId, id: DbId) -> Result<bool, CoreError> {
        AvailabilityRepo::delete(&self.pool, owner_id, id)
            .await
            .map_err(storage)
    }

    async fn add_favorite(
        &self,
        user_id: UserId,
        event_id: DbId,
    ) -> Result<(Favorite, bool), CoreError> {
        let (row, created) = FavoriteRepo::add(&self.pool, user_id, event_id)
            .await
            .map_err(|e| missing_event_or_storage(e, event_id))?;
        Ok((row.into(), created))
    }

    async fn remove_favorite(&self, user_id: UserId, event_id: DbId) -> Result<bool, CoreError> {
        FavoriteRepo::remove(&self.pool, user_id, event_id)
            .await
            .map_err(storage)
    }

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, CoreError> {
        Ok(FavoriteRepo::list_for_user(&self.pool, user_id)
            .await
            .map_err(storage)?
            .into_iter()
            .map(Favorite::from)
            .collect())
    }

    async fn add_contact(
        &self,
        user_id: UserId,
        event_id: DbId,
        message: Option<&str>,
    ) -> Result<Contact, CoreError> {
        ContactRepo::create(&self.pool, user_id, event_id, message)
            .await
            .map(Contact::from)
            .map_err(|e| missing_event_or_storage(e, event_id))
    }

    async fn list_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, CoreError> {
        Ok(ContactRepo::list_for_user(&self.pool, user_id)
            .await
            .map_err(storage)?
            .into_iter()
            .map(Contact::from)
            .collect())
    }

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, CoreError> {
        NotificationRepo::create(&self.pool, notification)
            .await
            .map_err(storage)?
            .try_into()
    }

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, CoreError> {
        NotificationRepo::list_for_user(&self.pool, user_id, unread_only)
            .await
            .map_err(storage)?
            .into_iter()
            .map(Notification::try_from)
            .collect()
    }

    async fn mark_notification_read(&self, user_id: UserId, id: DbId) -> Result<bool, CoreError> {
        NotificationRepo::mark_read(&self.pool, user_id, id)
            .await
            .map_err(storage)
    }

    async fn user_email(&self, user_id: UserId) -> Result<Option<String>, CoreError> {
        UserRepo::email(&self.pool, user_id).await.map_err(storage)
    }
}
