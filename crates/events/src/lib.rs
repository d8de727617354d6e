//! Gigify event bus and notification infrastructure.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlatformEvent`]: the domain event envelope published by the registry.
//! - [`NotificationDispatcher`]: background service turning accept, favorite
//!   and contact events into in-app notifications and owner emails.
//! - [`delivery`]: outbound email.

pub mod bus;
pub mod delivery;
pub mod dispatcher;

pub use bus::{EventBus, NotificationPayload, PlatformEvent};
pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use dispatcher::NotificationDispatcher;

/// Event type names published on the bus.
pub mod event_types {
    pub const EVENT_CREATED: &str = "event.created";
    pub const EVENT_UPDATED: &str = "event.updated";
    pub const EVENT_DELETED: &str = "event.deleted";
    pub const EVENT_ACCEPTED: &str = "event.accepted";
    pub const EVENT_FAVORITED: &str = "event.favorited";
    pub const EVENT_CONTACTED: &str = "event.contacted";
}
