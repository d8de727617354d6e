//! Event rows.

use gigify_core::error::CoreError;
use gigify_core::event::Event;
use gigify_core::geo::Coordinates;
use gigify_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::window_from_columns;

/// A row from `events` joined with its acceptance set.
#[derive(Debug, Clone, FromRow)]
pub struct EventRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub genre: String,
    pub description: String,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub location: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub capacity: i32,
    pub photo_ref: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub accepted_by: Vec<DbId>,
}

impl TryFrom<EventRow> for Event {
    type Error = CoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        let coordinates = match (row.latitude, row.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)?),
            _ => None,
        };
        Ok(Event {
            id: row.id,
            owner_id: row.owner_id,
            title: row.title,
            genre: row.genre,
            description: row.description,
            window: window_from_columns(row.start_at, row.end_at)?,
            location: row.location,
            coordinates,
            capacity: row.capacity,
            accepted_by: row.accepted_by.into_iter().collect(),
            photo_ref: row.photo_ref,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
