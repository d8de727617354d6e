//! Repository for the `favorites` table.

use gigify_core::types::DbId;
use sqlx::PgPool;

use crate::models::edge::FavoriteRow;

const COLUMNS: &str = "user_id, event_id, created_at";

pub struct FavoriteRepo;

impl FavoriteRepo {
    /// Idempotent insert. Returns the stored row and whether it was new.
    pub async fn add(pool: &PgPool, user_id: DbId, event_id: DbId) -> Result<(FavoriteRow, bool), sqlx::Error> {
        let query = format!(
            "INSERT INTO favorites (user_id, event_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, event_id) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, FavoriteRow>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(pool)
            .await?;
        if let Some(row) = inserted {
            return Ok((row, true));
        }

        let query = format!("SELECT {COLUMNS} FROM favorites WHERE user_id = $1 AND event_id = $2");
        let existing = sqlx::query_as::<_, FavoriteRow>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_one(pool)
            .await?;
        Ok((existing, false))
    }

    pub async fn remove(pool: &PgPool, user_id: DbId, event_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND event_id = $2")
            .bind(user_id)
            .bind(event_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<FavoriteRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM favorites WHERE user_id = $1 ORDER BY event_id");
        sqlx::query_as::<_, FavoriteRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
