//! Owner notifications for accept, favorite and contact events.
//!
//! [`NotificationDispatcher`] subscribes to the [`EventBus`](crate::bus::EventBus),
//! stores an in-app notification for the event owner and, when SMTP is
//! configured, emails them. Failures are logged and never reach the
//! operation that published the event.

use std::sync::Arc;

use gigify_core::store::{NewNotification, NotificationKind, ScheduleStore};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::PlatformEvent;
use crate::delivery::email::EmailDelivery;
use crate::event_types::{EVENT_ACCEPTED, EVENT_CONTACTED, EVENT_FAVORITED};

pub struct NotificationDispatcher {
    store: Arc<dyn ScheduleStore>,
    email: Option<EmailDelivery>,
}

impl NotificationDispatcher {
    pub fn new(store: Arc<dyn ScheduleStore>, email: Option<EmailDelivery>) -> Self {
        Self { store, email }
    }

    /// Run the dispatch loop until the bus closes or `cancel` fires.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification dispatcher cancelled");
                    break;
                }
                received = receiver.recv() => match received {
                    Ok(event) => self.handle(&event).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(skipped = n, "Notification dispatcher lagged, some notifications were dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::info!("Event bus closed, notification dispatcher shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Store and deliver the notification for one event, if it warrants one.
    pub async fn handle(&self, event: &PlatformEvent) {
        let Some(new) = notification_for(event) else {
            return;
        };

        let notification = match self.store.create_notification(&new).await {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(error = %e, event_type = %event.event_type, "Failed to store notification");
                return;
            }
        };
        tracing::debug!(
            notification_id = notification.id,
            recipient_id = notification.recipient_id,
            kind = notification.kind.as_str(),
            "Notification stored",
        );

        let Some(email) = &self.email else {
            return;
        };
        match self.store.user_email(notification.recipient_id).await {
            Ok(Some(address)) => {
                if let Err(e) = email.deliver(&address, &notification).await {
                    tracing::warn!(error = %e, recipient_id = notification.recipient_id, "Notification email failed");
                }
            }
            Ok(None) => {
                tracing::debug!(recipient_id = notification.recipient_id, "No email address, skipping delivery");
            }
            Err(e) => {
                tracing::warn!(error = %e, recipient_id = notification.recipient_id, "Failed to look up recipient email");
            }
        }
    }
}

/// Map a bus event to the notification it should produce.
///
/// Only accept/favorite/contact events by someone other than the owner
/// notify anyone.
pub fn notification_for(event: &PlatformEvent) -> Option<NewNotification> {
    let kind = match event.event_type.as_str() {
        EVENT_ACCEPTED => NotificationKind::Accepted,
        EVENT_FAVORITED => NotificationKind::Favorited,
        EVENT_CONTACTED => NotificationKind::Contacted,
        _ => return None,
    };
    let payload = event.notification_payload()?;
    let actor = event.actor_user_id;
    if actor == Some(payload.owner_id) {
        return None;
    }

    let who = actor.map_or_else(|| "Someone".to_string(), |id| format!("User {id}"));
    let mut message = match kind {
        NotificationKind::Accepted => format!("{who} accepted your event \"{}\"", payload.event_title),
        NotificationKind::Favorited => format!("{who} favorited your event \"{}\"", payload.event_title),
        NotificationKind::Contacted => format!("{who} contacted you about \"{}\"", payload.event_title),
    };
    if let Some(text) = payload.message.as_deref().filter(|t| !t.trim().is_empty()) {
        message.push_str(&format!(": {text}"));
    }

    Some(NewNotification {
        recipient_id: payload.owner_id,
        kind,
        event_id: event.source_entity_id,
        actor_id: actor,
        message,
    })
}
