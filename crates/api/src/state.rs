use std::sync::Arc;

use gigify_core::store::ScheduleStore;
use gigify_engine::Engine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// The scheduling engine (registry, interval set, reconciler, search).
    pub engine: Engine,
    /// Direct store access for reads with no engine logic (notifications).
    pub store: Arc<dyn ScheduleStore>,
    /// Present only on the Postgres backend; used by the health check.
    pub pool: Option<gigify_db::DbPool>,
    pub config: Arc<ServerConfig>,
}
