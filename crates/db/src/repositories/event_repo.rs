//! Repository for the `events` and `event_acceptances` tables.

use gigify_core::event::{Event, NewEvent};
use gigify_core::geo::Coordinates;
use gigify_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::event::EventRow;

/// Select list for [`EventRow`]; the acceptance set is aggregated inline.
const SELECT_EVENT: &str = "SELECT e.id, e.owner_id, e.title, e.genre, e.description, \
     e.start_at, e.end_at, e.location, e.latitude, e.longitude, e.capacity, e.photo_ref, \
     e.created_at, e.updated_at, \
     ARRAY(SELECT a.user_id FROM event_acceptances a WHERE a.event_id = e.id ORDER BY a.user_id) \
         AS accepted_by \
     FROM events e";

pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning its generated id.
    pub async fn insert(pool: &PgPool, owner_id: DbId, input: &NewEvent) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO events \
                 (owner_id, title, genre, description, start_at, end_at, location, capacity, photo_ref) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(owner_id)
        .bind(&input.title)
        .bind(&input.genre)
        .bind(&input.description)
        .bind(input.window.start())
        .bind(input.window.end())
        .bind(&input.location)
        .bind(input.capacity)
        .bind(&input.photo_ref)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<EventRow>, sqlx::Error> {
        let query = format!("{SELECT_EVENT} WHERE e.id = $1");
        sqlx::query_as::<_, EventRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the editable columns. Returns `false` if the row is gone.
    ///
    /// Coordinates are never taken from `event`: they survive an unchanged
    /// location and are cleared by a new one.
    pub async fn update(pool: &PgPool, event: &Event) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET \
                 title = $2, genre = $3, description = $4, start_at = $5, end_at = $6, \
                 latitude = CASE WHEN location = $7 THEN latitude ELSE NULL END, \
                 longitude = CASE WHEN location = $7 THEN longitude ELSE NULL END, \
                 location = $7, capacity = $8, photo_ref = $9, updated_at = $10 \
             WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.title)
        .bind(&event.genre)
        .bind(&event.description)
        .bind(event.window.start())
        .bind(event.window.end())
        .bind(&event.location)
        .bind(event.capacity)
        .bind(&event.photo_ref)
        .bind(event.updated_at)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Store geocoding output, only if the location is still the one that was
    /// looked up.
    pub async fn set_coordinates(
        pool: &PgPool,
        id: DbId,
        location: &str,
        coordinates: Coordinates,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET latitude = $3, longitude = $4 \
             WHERE id = $1 AND location = $2",
        )
        .bind(id)
        .bind(location)
        .bind(coordinates.lat)
        .bind(coordinates.lng)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete an event. Favorites, contacts and acceptances go with it via
    /// `ON DELETE CASCADE`.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set-add into the acceptance set. Returns `true` only for a new row.
    pub async fn add_acceptance(pool: &PgPool, event_id: DbId, user_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO event_acceptances (event_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (event_id, user_id) DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Events ending after `as_of`, by start then id.
    pub async fn list_upcoming(pool: &PgPool, as_of: Timestamp) -> Result<Vec<EventRow>, sqlx::Error> {
        let query = format!("{SELECT_EVENT} WHERE e.end_at > $1 ORDER BY e.start_at, e.id");
        sqlx::query_as::<_, EventRow>(&query)
            .bind(as_of)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<EventRow>, sqlx::Error> {
        let query = format!("{SELECT_EVENT} WHERE e.owner_id = $1 ORDER BY e.start_at, e.id");
        sqlx::query_as::<_, EventRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_accepted_by(pool: &PgPool, user_id: DbId) -> Result<Vec<EventRow>, sqlx::Error> {
        let query = format!(
            "{SELECT_EVENT} \
             WHERE EXISTS (SELECT 1 FROM event_acceptances x WHERE x.event_id = e.id AND x.user_id = $1) \
             ORDER BY e.start_at, e.id"
        );
        sqlx::query_as::<_, EventRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
