//! Handlers for `/me`: the caller's own events and edges.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/me/events
pub async fn my_events(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let events = state.engine.registry.owned_by(auth.user_id).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/me/favorites
pub async fn my_favorites(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let favorites = state.engine.registry.favorites(auth.user_id).await?;
    Ok(Json(DataResponse { data: favorites }))
}

/// GET /api/v1/me/contacts
pub async fn my_contacts(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let contacts = state.engine.registry.contacts(auth.user_id).await?;
    Ok(Json(DataResponse { data: contacts }))
}
