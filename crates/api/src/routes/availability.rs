//! Route definitions for the `/availability` resource.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::availability;
use crate::state::AppState;

/// Routes mounted at `/availability`.
///
/// ```text
/// GET    /                 -> list_windows
/// POST   /                 -> submit_window
/// GET    /overlapping      -> overlapping_windows
/// GET    /free             -> is_free
/// DELETE /{id}             -> remove_window
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(availability::list_windows).post(availability::submit_window),
        )
        .route("/overlapping", get(availability::overlapping_windows))
        .route("/free", get(availability::is_free))
        .route("/{id}", delete(availability::remove_window))
}
