//! Reconciliation Engine: one user's merged, conflict-annotated schedule.

use std::sync::Arc;

use gigify_calendar::CalendarClient;
use gigify_core::calendar::ExternalCalendarEvent;
use gigify_core::error::CoreError;
use gigify_core::schedule::{reconcile, ExternalStatus, Schedule, ScheduleInputs};
use gigify_core::store::ScheduleStore;
use gigify_core::time_window::TimeWindow;
use gigify_core::types::{Timestamp, UserId};

use crate::availability::IntervalSet;
use crate::config::EngineConfig;

/// Parameters of one schedule build.
#[derive(Debug, Clone)]
pub struct ScheduleRequest {
    /// Items ending at or before this instant are left out.
    pub as_of: Timestamp,
    /// External calendar access token. `None` skips the external merge.
    pub credential: Option<String>,
    /// Keep external entries not written by the platform.
    pub include_foreign: bool,
}

pub struct ReconciliationEngine {
    store: Arc<dyn ScheduleStore>,
    intervals: Arc<IntervalSet>,
    calendar: Arc<dyn CalendarClient>,
    config: EngineConfig,
}

impl ReconciliationEngine {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        intervals: Arc<IntervalSet>,
        calendar: Arc<dyn CalendarClient>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            intervals,
            calendar,
            config,
        }
    }

    /// Build the schedule. A failing or slow external calendar degrades to
    /// platform data only and is reported in `external_status`.
    pub async fn schedule(
        &self,
        user_id: UserId,
        request: ScheduleRequest,
    ) -> Result<Schedule, CoreError> {
        let as_of = request.as_of;
        let (availability, owned, accepted) = tokio::try_join!(
            self.store.list_availability(user_id),
            self.store.list_owned(user_id),
            self.store.list_accepted(user_id),
        )?;
        let (external, external_status) = self.fetch_external(user_id, &request).await;

        let inputs = ScheduleInputs {
            availability: availability
                .into_iter()
                .filter(|w| w.window.end() > as_of)
                .collect(),
            owned: owned.into_iter().filter(|e| e.window.end() > as_of).collect(),
            accepted: accepted
                .into_iter()
                .filter(|e| e.window.end() > as_of)
                .collect(),
            external,
            include_foreign: request.include_foreign,
        };

        let schedule = reconcile(user_id, inputs, external_status);
        tracing::debug!(
            user_id,
            items = schedule.items.len(),
            conflicts = schedule.conflicts.len(),
            "Schedule reconciled",
        );
        Ok(schedule)
    }

    /// Free for the whole of `window`: covered by availability and clear of
    /// owned and accepted events.
    pub async fn is_available(&self, user_id: UserId, window: &TimeWindow) -> Result<bool, CoreError> {
        self.intervals.is_free(user_id, window).await
    }

    async fn fetch_external(
        &self,
        user_id: UserId,
        request: &ScheduleRequest,
    ) -> (Vec<ExternalCalendarEvent>, ExternalStatus) {
        let Some(credential) = request.credential.as_deref() else {
            return (Vec::new(), ExternalStatus::Skipped);
        };

        let fetch = self.calendar.list_upcoming(
            credential,
            request.as_of,
            self.config.calendar_max_results,
        );
        match tokio::time::timeout(self.config.calendar_timeout, fetch).await {
            Ok(Ok(entries)) => (entries, ExternalStatus::Included),
            Ok(Err(e)) => {
                tracing::warn!(user_id, error = %e, "External calendar unavailable, using platform data only");
                (
                    Vec::new(),
                    ExternalStatus::Unavailable {
                        reason: e.to_string(),
                    },
                )
            }
            Err(_) => {
                tracing::warn!(
                    user_id,
                    timeout = ?self.config.calendar_timeout,
                    "External calendar timed out, using platform data only",
                );
                (
                    Vec::new(),
                    ExternalStatus::Unavailable {
                        reason: format!("timed out after {:?}", self.config.calendar_timeout),
                    },
                )
            }
        }
    }
}
