//! Handlers for `/search`.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use gigify_core::error::CoreError;
use gigify_core::search::SearchCriteria;
use gigify_core::time_window::TimeWindow;
use gigify_core::types::UserId;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /search/sample`: search criteria plus a sample size.
#[derive(Debug, Deserialize)]
pub struct SampleRequest {
    #[serde(flatten)]
    pub criteria: SearchCriteria,
    pub count: usize,
}

/// Body of `POST /search/available`. At most 200 candidates.
#[derive(Debug, Deserialize, Validate)]
pub struct AvailableAmongRequest {
    #[validate(length(max = 200))]
    pub candidates: Vec<UserId>,
    pub window: TimeWindow,
}

/// POST /api/v1/search
///
/// The response reports whether the distance filter was applied, skipped
/// (search location could not be resolved) or not requested.
pub async fn search_events(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(criteria): Json<SearchCriteria>,
) -> AppResult<impl IntoResponse> {
    let results = state.engine.search.search(&criteria, Utc::now()).await?;
    Ok(Json(DataResponse { data: results }))
}

/// POST /api/v1/search/sample
///
/// `count` distinct matches drawn uniformly at random, or
/// `422 INSUFFICIENT_CANDIDATES` when fewer match.
pub async fn sample_events(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<SampleRequest>,
) -> AppResult<impl IntoResponse> {
    let events = state
        .engine
        .search
        .sample_events(&input.criteria, input.count, Utc::now())
        .await?;
    Ok(Json(DataResponse { data: events }))
}

/// POST /api/v1/search/available
///
/// The candidates free for the whole window, in the order given. More than
/// 200 candidates is a `400 VALIDATION_ERROR`.
pub async fn available_among(
    _auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<AvailableAmongRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(CoreError::from)?;
    let free = state
        .engine
        .search
        .available_among(&input.candidates, &input.window)
        .await?;
    Ok(Json(DataResponse { data: free }))
}
