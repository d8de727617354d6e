//! Row types for every table, with conversions into the domain types.
//!
//! Rows are decoded with `sqlx::FromRow` and converted with `TryFrom`, which
//! re-checks the invariants (`start < end`, coordinate ranges) that the
//! domain types enforce.

pub mod availability;
pub mod edge;
pub mod event;
pub mod notification;

use gigify_core::error::CoreError;
use gigify_core::time_window::TimeWindow;
use gigify_core::types::Timestamp;

/// Rebuild a window from its two columns.
pub(crate) fn window_from_columns(start_at: Timestamp, end_at: Timestamp) -> Result<TimeWindow, CoreError> {
    TimeWindow::new(start_at, end_at)
        .map_err(|e| CoreError::Storage(format!("corrupt window in database: {e}")))
}
