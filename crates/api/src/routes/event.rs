//! Route definitions for the `/events` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::event;
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// POST   /                 -> create_event
/// GET    /upcoming         -> list_upcoming
/// GET    /{id}             -> get_event
/// PUT    /{id}             -> update_event
/// DELETE /{id}             -> delete_event
/// POST   /{id}/accept      -> accept_event
/// POST   /{id}/favorite    -> favorite_event
/// DELETE /{id}/favorite    -> unfavorite_event
/// POST   /{id}/contact     -> contact_owner
/// POST   /{id}/calendar    -> mirror_to_calendar
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(event::create_event))
        .route("/upcoming", get(event::list_upcoming))
        .route(
            "/{id}",
            get(event::get_event)
                .put(event::update_event)
                .delete(event::delete_event),
        )
        .route("/{id}/accept", post(event::accept_event))
        .route(
            "/{id}/favorite",
            post(event::favorite_event).delete(event::unfavorite_event),
        )
        .route("/{id}/contact", post(event::contact_owner))
        .route("/{id}/calendar", post(event::mirror_to_calendar))
}
