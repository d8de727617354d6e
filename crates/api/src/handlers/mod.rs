pub mod availability;
pub mod event;
pub mod me;
pub mod notification;
pub mod schedule;
pub mod search;

use gigify_core::error::CoreError;
use gigify_core::time_window::TimeWindow;
use gigify_core::types::Timestamp;
use serde::Deserialize;

/// `?start=..&end=..` query pair, RFC 3339 timestamps.
#[derive(Debug, Deserialize)]
pub struct WindowQuery {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl WindowQuery {
    pub fn window(&self) -> Result<TimeWindow, CoreError> {
        TimeWindow::new(self.start, self.end)
    }
}
