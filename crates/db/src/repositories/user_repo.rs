//! Repository for the `users` contact table.

use gigify_core::types::DbId;
use sqlx::PgPool;

pub struct UserRepo;

impl UserRepo {
    /// Insert or refresh a user's contact details.
    pub async fn upsert(
        pool: &PgPool,
        id: DbId,
        email: Option<&str>,
        display_name: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (id, email, display_name) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET email = EXCLUDED.email, display_name = EXCLUDED.display_name",
        )
        .bind(id)
        .bind(email)
        .bind(display_name)
        .execute(pool)
        .await?;
        Ok(())
    }

    pub async fn email(pool: &PgPool, id: DbId) -> Result<Option<String>, sqlx::Error> {
        let email: Option<Option<String>> =
            sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(email.flatten())
    }
}
