//! Repository for the `notifications` table.

use gigify_core::store::NewNotification;
use gigify_core::types::DbId;
use sqlx::PgPool;

use crate::models::notification::NotificationRow;

const COLUMNS: &str = "id, recipient_id, kind, event_id, actor_id, message, is_read, created_at";

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn create(pool: &PgPool, input: &NewNotification) -> Result<NotificationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications (recipient_id, kind, event_id, actor_id, message) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(input.recipient_id)
            .bind(input.kind.as_str())
            .bind(input.event_id)
            .bind(input.actor_id)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// Newest first. When `unread_only` is `true`, read notifications are skipped.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        unread_only: bool,
    ) -> Result<Vec<NotificationRow>, sqlx::Error> {
        let filter = if unread_only { "AND is_read = false" } else { "" };
        let query = format!(
            "SELECT {COLUMNS} FROM notifications \
             WHERE recipient_id = $1 {filter} \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, NotificationRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Returns `true` if the notification exists for the given user.
    pub async fn mark_read(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = true WHERE id = $1 AND recipient_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
