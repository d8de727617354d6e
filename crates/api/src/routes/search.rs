use axum::routing::post;
use axum::Router;

use crate::handlers::search;
use crate::state::AppState;

/// Routes mounted at `/search`.
///
/// ```text
/// POST   /                 -> search_events
/// POST   /sample           -> sample_events
/// POST   /available        -> available_among
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(search::search_events))
        .route("/sample", post(search::sample_events))
        .route("/available", post(search::available_among))
}
