use axum::routing::get;
use axum::Router;

use crate::handlers::schedule;
use crate::state::AppState;

/// Routes mounted at `/schedule`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(schedule::get_schedule))
        .route("/available", get(schedule::is_available))
}
