//! Handlers for `/schedule`: the caller's reconciled schedule.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use gigify_core::types::Timestamp;
use gigify_engine::ScheduleRequest;
use serde::{Deserialize, Serialize};

use super::WindowQuery;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::calendar::CalendarToken;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /schedule`.
#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    /// Items ending at or before this instant are left out. Defaults to now.
    pub as_of: Option<Timestamp>,
    /// Also merge external entries the platform did not write.
    #[serde(default)]
    pub include_foreign: bool,
}

#[derive(Debug, Serialize)]
pub struct AvailableResponse {
    pub available: bool,
}

/// GET /api/v1/schedule
///
/// With an `X-Calendar-Token` header the caller's external calendar is
/// merged in; a provider outage degrades to platform data only.
pub async fn get_schedule(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ScheduleQuery>,
    CalendarToken(credential): CalendarToken,
) -> AppResult<impl IntoResponse> {
    let request = ScheduleRequest {
        as_of: params.as_of.unwrap_or_else(Utc::now),
        credential,
        include_foreign: params.include_foreign,
    };
    let schedule = state
        .engine
        .reconciler
        .schedule(auth.user_id, request)
        .await?;
    Ok(Json(DataResponse { data: schedule }))
}

/// GET /api/v1/schedule/available?start=..&end=..
pub async fn is_available(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<WindowQuery>,
) -> AppResult<impl IntoResponse> {
    let window = params.window()?;
    let available = state
        .engine
        .reconciler
        .is_available(auth.user_id, &window)
        .await?;
    Ok(Json(DataResponse {
        data: AvailableResponse { available },
    }))
}
