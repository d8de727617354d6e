//! Handlers for the `/availability` resource: the caller's interval set.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gigify_core::availability::{AvailabilityWindow, SubmitAvailability};
use gigify_core::time_window::TimeWindow;
use gigify_core::types::{DbId, Timestamp, UserId};
use gigify_engine::InsertOutcome;
use serde::{Deserialize, Serialize};

use super::WindowQuery;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /availability/free`.
#[derive(Debug, Deserialize)]
pub struct FreeQuery {
    pub start: Timestamp,
    pub end: Timestamp,
    /// Whose availability to check. Defaults to the caller.
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct FreeResponse {
    pub user_id: UserId,
    pub free: bool,
}

/// GET /api/v1/availability
pub async fn list_windows(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let windows = state.engine.intervals.list(auth.user_id).await?;
    Ok(Json(DataResponse { data: windows }))
}

/// POST /api/v1/availability
///
/// `201` when a window was stored, `200` when an identical or containing
/// window already covered it. Partial overlap is `409 OVERLAP_CONFLICT`.
pub async fn submit_window(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SubmitAvailability>,
) -> AppResult<impl IntoResponse> {
    let outcome = state.engine.intervals.insert(auth.user_id, input).await?;
    let status = match outcome {
        InsertOutcome::Created { .. } => StatusCode::CREATED,
        InsertOutcome::Unchanged { .. } => StatusCode::OK,
    };
    Ok((status, Json(DataResponse { data: outcome })))
}

/// DELETE /api/v1/availability/{id}
pub async fn remove_window(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(window_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.engine.intervals.remove(auth.user_id, window_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/availability/overlapping?start=..&end=..
pub async fn overlapping_windows(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> AppResult<impl IntoResponse> {
    let target = params.window()?;
    let windows: Vec<AvailabilityWindow> = state
        .engine
        .intervals
        .windows_overlapping(auth.user_id, target)
        .await?
        .collect();
    Ok(Json(DataResponse { data: windows }))
}

/// GET /api/v1/availability/free?start=..&end=..[&user_id=..]
///
/// Free means covered by availability and clear of owned or accepted events.
pub async fn is_free(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<FreeQuery>,
) -> AppResult<impl IntoResponse> {
    let target = TimeWindow::new(params.start, params.end)?;
    let user_id = params.user_id.unwrap_or(auth.user_id);
    let free = state.engine.intervals.is_free(user_id, &target).await?;
    Ok(Json(DataResponse {
        data: FreeResponse { user_id, free },
    }))
}
