use gigify_core::error::CoreError;
use gigify_core::store::{Notification, NotificationKind};
use gigify_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `notifications` table.
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: DbId,
    pub recipient_id: DbId,
    pub kind: String,
    pub event_id: Option<DbId>,
    pub actor_id: Option<DbId>,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = CoreError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let kind = NotificationKind::parse(&row.kind)
            .ok_or_else(|| CoreError::Storage(format!("unknown notification kind '{}'", row.kind)))?;
        Ok(Notification {
            id: row.id,
            recipient_id: row.recipient_id,
            kind,
            event_id: row.event_id,
            actor_id: row.actor_id,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        })
    }
}
