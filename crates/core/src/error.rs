use crate::time_window::TimeWindow;
use crate::types::DbId;

/// Domain error taxonomy shared by the engine, the store implementations and
/// the HTTP layer.
///
/// Validation and authorization variants are raised before any state change.
/// External-dependency failures (geocoding, calendar) are not represented here
/// because the engine absorbs them and degrades instead.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not owner: {entity} {id} belongs to another user")]
    NotOwner { entity: &'static str, id: DbId },

    #[error("Availability window {submitted} partially overlaps existing window {existing}")]
    OverlapConflict {
        existing: TimeWindow,
        submitted: TimeWindow,
    },

    #[error("Insufficient candidates: requested {requested}, only {available} available")]
    InsufficientCandidates { requested: usize, available: usize },

    #[error("Invalid coordinates: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated, but not allowed to act on this resource.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// An external provider failed on an operation that cannot degrade
    /// (writing to a user's calendar).
    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}
