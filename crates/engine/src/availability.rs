//! Interval Set: each owner's non-overlapping availability windows.

use std::sync::Arc;

use gigify_core::availability::{
    is_free, plan_insert, AvailabilityWindow, InsertPlan, SubmitAvailability, WindowsOverlapping,
};
use gigify_core::error::CoreError;
use gigify_core::store::ScheduleStore;
use gigify_core::time_window::TimeWindow;
use gigify_core::types::{DbId, UserId};
use serde::Serialize;
use tokio::sync::Mutex;
use validator::Validate;

/// Result of a successful insertion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum InsertOutcome {
    /// The window was stored, replacing the windows it contained.
    Created {
        window: AvailabilityWindow,
        superseded: Vec<DbId>,
    },
    /// An identical or containing window already exists and is returned.
    Unchanged { window: AvailabilityWindow },
}

impl InsertOutcome {
    pub fn window(&self) -> &AvailabilityWindow {
        match self {
            InsertOutcome::Created { window, .. } | InsertOutcome::Unchanged { window } => window,
        }
    }
}

pub struct IntervalSet {
    store: Arc<dyn ScheduleStore>,
    /// Serializes plan-then-apply so two submissions cannot both pass the
    /// overlap check against the same snapshot.
    write_lock: Mutex<()>,
}

impl IntervalSet {
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Add a window to the owner's set. Partial overlap is rejected with no
    /// state change.
    pub async fn insert(
        &self,
        owner_id: UserId,
        submission: SubmitAvailability,
    ) -> Result<InsertOutcome, CoreError> {
        submission.validate()?;
        let _guard = self.write_lock.lock().await;

        let existing = self.store.list_availability(owner_id).await?;
        match plan_insert(&existing, &submission.window)? {
            InsertPlan::Unchanged(window) => {
                tracing::debug!(owner_id, window_id = window.id, "Availability already covered");
                Ok(InsertOutcome::Unchanged { window })
            }
            InsertPlan::Insert { supersede } => {
                let window = self
                    .store
                    .replace_availability(owner_id, submission.window, &submission.label, &supersede)
                    .await?;
                tracing::info!(
                    owner_id,
                    window_id = window.id,
                    superseded = supersede.len(),
                    "Availability window created",
                );
                Ok(InsertOutcome::Created {
                    window,
                    superseded: supersede,
                })
            }
        }
    }

    /// Inside the union of the owner's availability and clear of every event
    /// they own or accepted.
    pub async fn is_free(&self, owner_id: UserId, target: &TimeWindow) -> Result<bool, CoreError> {
        let (availability, owned, accepted) = tokio::try_join!(
            self.store.list_availability(owner_id),
            self.store.list_owned(owner_id),
            self.store.list_accepted(owner_id),
        )?;
        let busy = owned.iter().chain(accepted.iter()).map(|e| &e.window);
        Ok(is_free(&availability, busy, target))
    }

    pub async fn windows_overlapping(
        &self,
        owner_id: UserId,
        target: TimeWindow,
    ) -> Result<WindowsOverlapping, CoreError> {
        let windows = self.store.list_availability(owner_id).await?;
        Ok(WindowsOverlapping::new(windows, target))
    }

    /// All of the owner's windows, ordered by start.
    pub async fn list(&self, owner_id: UserId) -> Result<Vec<AvailabilityWindow>, CoreError> {
        let mut windows = self.store.list_availability(owner_id).await?;
        windows.sort_by(|a, b| a.window.cmp(&b.window).then(a.id.cmp(&b.id)));
        Ok(windows)
    }

    pub async fn remove(&self, owner_id: UserId, window_id: DbId) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().await;
        if !self.store.delete_availability(owner_id, window_id).await? {
            return Err(CoreError::NotFound {
                entity: "availability_window",
                id: window_id,
            });
        }
        tracing::info!(owner_id, window_id, "Availability window removed");
        Ok(())
    }
}
