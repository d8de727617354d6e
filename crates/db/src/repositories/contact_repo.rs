//! Repository for the append-only `contacts` table.

use gigify_core::types::DbId;
use sqlx::PgPool;

use crate::models::edge::ContactRow;

const COLUMNS: &str = "id, user_id, event_id, message, created_at";

pub struct ContactRepo;

impl ContactRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
        message: Option<&str>,
    ) -> Result<ContactRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO contacts (user_id, event_id, message) VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContactRow>(&query)
            .bind(user_id)
            .bind(event_id)
            .bind(message)
            .fetch_one(pool)
            .await
    }

    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<ContactRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM contacts WHERE user_id = $1 ORDER BY id");
        sqlx::query_as::<_, ContactRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}
