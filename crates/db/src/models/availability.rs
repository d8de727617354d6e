use gigify_core::availability::AvailabilityWindow;
use gigify_core::error::CoreError;
use gigify_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::window_from_columns;

/// A row from the `availability_windows` table.
#[derive(Debug, Clone, FromRow)]
pub struct AvailabilityRow {
    pub id: DbId,
    pub owner_id: DbId,
    pub start_at: Timestamp,
    pub end_at: Timestamp,
    pub label: String,
    pub created_by: DbId,
    pub created_at: Timestamp,
}

impl TryFrom<AvailabilityRow> for AvailabilityWindow {
    type Error = CoreError;

    fn try_from(row: AvailabilityRow) -> Result<Self, Self::Error> {
        Ok(AvailabilityWindow {
            id: row.id,
            owner_id: row.owner_id,
            window: window_from_columns(row.start_at, row.end_at)?,
            label: row.label,
            created_by: row.created_by,
            created_at: row.created_at,
        })
    }
}
