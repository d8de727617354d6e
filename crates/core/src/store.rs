//! The persistence trait the engine depends on.
//!
//! Backends (`gigify-db::PgStore`, `gigify-engine::MemoryStore`) implement it so
//! the engine never sees a specific database engine. Every method that
//! changes more than one record must be atomic in the implementation.

use serde::{Deserialize, Serialize};

use crate::availability::AvailabilityWindow;
use crate::error::CoreError;
use crate::event::{Event, NewEvent};
use crate::geo::Coordinates;
use crate::time_window::TimeWindow;
use crate::types::{DbId, Timestamp, UserId};

/// A user's favorite edge to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favorite {
    pub user_id: UserId,
    pub event_id: DbId,
    pub created_at: Timestamp,
}

/// A record that a user contacted an event's owner about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: DbId,
    pub user_id: UserId,
    pub event_id: DbId,
    pub message: Option<String>,
    pub created_at: Timestamp,
}

/// Kinds of in-app notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Accepted,
    Favorited,
    Contacted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Accepted => "accepted",
            NotificationKind::Favorited => "favorited",
            NotificationKind::Contacted => "contacted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accepted" => Some(NotificationKind::Accepted),
            "favorited" => Some(NotificationKind::Favorited),
            "contacted" => Some(NotificationKind::Contacted),
            _ => None,
        }
    }
}

/// An in-app notification addressed to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: DbId,
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    pub event_id: Option<DbId>,
    pub actor_id: Option<UserId>,
    pub message: String,
    pub is_read: bool,
    pub created_at: Timestamp,
}

/// Insert DTO for [`Notification`].
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: UserId,
    pub kind: NotificationKind,
    pub event_id: Option<DbId>,
    pub actor_id: Option<UserId>,
    pub message: String,
}

/// Storage operations used by the engine and the notification dispatcher.
#[async_trait::async_trait]
pub trait ScheduleStore: Send + Sync {
    // ─────────────────────────────── Events ───────────────────────────────

    /// Persist an already-validated event. Coordinates start unresolved.
    async fn insert_event(&self, owner_id: UserId, fields: &NewEvent) -> Result<Event, CoreError>;

    async fn get_event(&self, id: DbId) -> Result<Option<Event>, CoreError>;

    /// Overwrite the owner-editable fields of `event`. Stored coordinates are
    /// kept while the location is unchanged and cleared when it differs; only
    /// [`set_event_coordinates`](Self::set_event_coordinates) writes them.
    async fn update_event(&self, event: &Event) -> Result<Option<Event>, CoreError>;

    /// Store geocoding output. Ignored when the event no longer exists or its
    /// location changed since the lookup started.
    async fn set_event_coordinates(
        &self,
        id: DbId,
        location: &str,
        coordinates: Coordinates,
    ) -> Result<bool, CoreError>;

    /// Delete the event together with its favorites, contacts and acceptances.
    /// Returns `false` when the event did not exist.
    async fn delete_event_cascade(&self, id: DbId) -> Result<bool, CoreError>;

    /// Atomic set-union into `accepted_by`. Returns `true` only when the user
    /// was newly added.
    async fn add_acceptance(&self, event_id: DbId, user_id: UserId) -> Result<bool, CoreError>;

    /// Events with `window.end > as_of`, ordered by start then id.
    async fn list_upcoming(&self, as_of: Timestamp) -> Result<Vec<Event>, CoreError>;

    async fn list_owned(&self, owner_id: UserId) -> Result<Vec<Event>, CoreError>;

    async fn list_accepted(&self, user_id: UserId) -> Result<Vec<Event>, CoreError>;

    // ─────────────────────────────── Availability ───────────────────────────

    async fn list_availability(&self, owner_id: UserId)
        -> Result<Vec<AvailabilityWindow>, CoreError>;

    /// Remove `supersede` and insert the new window in one transaction.
    async fn replace_availability(
        &self,
        owner_id: UserId,
        window: TimeWindow,
        label: &str,
        supersede: &[DbId],
    ) -> Result<AvailabilityWindow, CoreError>;

    async fn delete_availability(&self, owner_id: UserId, id: DbId) -> Result<bool, CoreError>;

    // ─────────────────────────────── Edges ────────────────────────────────

    /// Idempotent. Returns the record and whether it was newly created.
    async fn add_favorite(
        &self,
        user_id: UserId,
        event_id: DbId,
    ) -> Result<(Favorite, bool), CoreError>;

    async fn remove_favorite(&self, user_id: UserId, event_id: DbId) -> Result<bool, CoreError>;

    async fn list_favorites(&self, user_id: UserId) -> Result<Vec<Favorite>, CoreError>;

    async fn add_contact(
        &self,
        user_id: UserId,
        event_id: DbId,
        message: Option<&str>,
    ) -> Result<Contact, CoreError>;

    async fn list_contacts(&self, user_id: UserId) -> Result<Vec<Contact>, CoreError>;

    // ─────────────────────────────── Notifications ──────────────────────────

    async fn create_notification(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, CoreError>;

    async fn list_notifications(
        &self,
        user_id: UserId,
        unread_only: bool,
    ) -> Result<Vec<Notification>, CoreError>;

    async fn mark_notification_read(&self, user_id: UserId, id: DbId) -> Result<bool, CoreError>;

    /// Contact address for outbound email, when the profile has one.
    async fn user_email(&self, user_id: UserId) -> Result<Option<String>, CoreError>;
}
