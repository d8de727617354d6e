//! Favorite and contact rows.

use gigify_core::store::{Contact, Favorite};
use gigify_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `favorites` table.
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteRow {
    pub user_id: DbId,
    pub event_id: DbId,
    pub created_at: Timestamp,
}

impl From<FavoriteRow> for Favorite {
    fn from(row: FavoriteRow) -> Self {
        Favorite {
            user_id: row.user_id,
            event_id: row.event_id,
            created_at: row.created_at,
        }
    }
}

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow)]
pub struct ContactRow {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Contact {
            id: row.id,
            user_id: row.user_id,
            event_id: row.event_id,
            message: row.message,
            created_at: row.created_at,
        }
    }
}
