//! Repository for the `availability_windows` table.

use gigify_core::time_window::TimeWindow;
use gigify_core::types::DbId;
use sqlx::PgPool;

use crate::models::availability::AvailabilityRow;

const COLUMNS: &str = "id, owner_id, start_at, end_at, label, created_by, created_at";

pub struct AvailabilityRepo;

impl AvailabilityRepo {
    /// All windows of one owner, by start.
    pub async fn list_by_owner(pool: &PgPool, owner_id: DbId) -> Result<Vec<AvailabilityRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM availability_windows \
             WHERE owner_id = $1 ORDER BY start_at, end_at, id"
        );
        sqlx::query_as::<_, AvailabilityRow>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Remove `supersede` and insert the new window in one transaction.
    pub async fn replace(
        pool: &PgPool,
        owner_id: DbId,
        window: &TimeWindow,
        label: &str,
        supersede: &[DbId],
    ) -> Result<AvailabilityRow, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !supersede.is_empty() {
            sqlx::query("DELETE FROM availability_windows WHERE owner_id = $1 AND id = ANY($2)")
                .bind(owner_id)
                .bind(supersede)
                .execute(&mut *tx)
                .await?;
        }

        let query = format!(
            "INSERT INTO availability_windows (owner_id, start_at, end_at, label, created_by) \
             VALUES ($1, $2, $3, $4, $1) \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, AvailabilityRow>(&query)
            .bind(owner_id)
            .bind(window.start())
            .bind(window.end())
            .bind(label)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// Returns `true` if a window owned by `owner_id` was removed.
    pub async fn delete(pool: &PgPool, owner_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM availability_windows WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
