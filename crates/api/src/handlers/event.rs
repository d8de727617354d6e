//! Handlers for the `/events` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Ownership checks
//! happen in the engine and surface as `403 NOT_OWNER`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use gigify_core::event::{EventPatch, NewEvent};
use gigify_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::calendar::CalendarToken;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /events/upcoming`.
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    /// Reference instant. Defaults to now.
    pub as_of: Option<Timestamp>,
}

/// Body of `POST /events/{id}/contact`.
#[derive(Debug, Default, Deserialize)]
pub struct ContactRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MirrorResponse {
    pub event_id: DbId,
    pub external_id: String,
}

// ---------------------------------------------------------------------------
// Event CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/events
pub async fn create_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<NewEvent>,
) -> AppResult<impl IntoResponse> {
    let event = state.engine.registry.create(auth.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: event })))
}

/// GET /api/v1/events/upcoming
///
/// Events whose end lies after `as_of`, ordered by start then id.
pub async fn list_upcoming(
    _auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UpcomingQuery>,
) -> AppResult<impl IntoResponse> {
    let as_of = params.as_of.unwrap_or_else(Utc::now);
    let events = state.engine.registry.upcoming(as_of).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    _auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = state.engine.registry.get(event_id).await?;
    Ok(Json(DataResponse { data: event }))
}

/// PUT /api/v1/events/{id}
pub async fn update_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(patch): Json<EventPatch>,
) -> AppResult<impl IntoResponse> {
    let event = state
        .engine
        .registry
        .update(event_id, auth.user_id, patch)
        .await?;
    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
///
/// Removes the event with its favorites, contacts and acceptances.
pub async fn delete_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.engine.registry.delete(event_id, auth.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Edges
// ---------------------------------------------------------------------------

/// POST /api/v1/events/{id}/accept
///
/// Idempotent. Returns the event with the caller in `accepted_by`.
pub async fn accept_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = state.engine.registry.accept(event_id, auth.user_id).await?;
    Ok(Json(DataResponse { data: event }))
}

/// POST /api/v1/events/{id}/favorite
pub async fn favorite_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let favorite = state
        .engine
        .registry
        .favorite(auth.user_id, event_id)
        .await?;
    Ok(Json(DataResponse { data: favorite }))
}

/// DELETE /api/v1/events/{id}/favorite
pub async fn unfavorite_event(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state
        .engine
        .registry
        .unfavorite(auth.user_id, event_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{id}/contact
pub async fn contact_owner(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<ContactRequest>,
) -> AppResult<impl IntoResponse> {
    let contact = state
        .engine
        .registry
        .contact(auth.user_id, event_id, input.message)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: contact })))
}

/// POST /api/v1/events/{id}/calendar
///
/// Writes the event into the caller's external calendar. Requires the
/// `X-Calendar-Token` header.
pub async fn mirror_to_calendar(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    CalendarToken(token): CalendarToken,
) -> AppResult<impl IntoResponse> {
    let token = token.ok_or_else(|| {
        AppError::BadRequest("X-Calendar-Token header is required".to_string())
    })?;
    let external_id = state
        .engine
        .registry
        .mirror_to_calendar(event_id, auth.user_id, &token)
        .await?;
    tracing::info!(event_id, user_id = auth.user_id, "Event mirrored to external calendar");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: MirrorResponse {
                event_id,
                external_id,
            },
        }),
    ))
}
