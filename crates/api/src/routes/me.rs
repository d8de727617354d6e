use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(me::my_events))
        .route("/favorites", get(me::my_favorites))
        .route("/contacts", get(me::my_contacts))
}
