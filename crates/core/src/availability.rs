//! Availability windows and the insertion policy of an owner's interval set.
//!
//! Pure logic: the engine reads the owner's current windows from the store,
//! asks [`plan_insert`] what to do, then applies the plan atomically.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::time_window::{union_covers, TimeWindow};
use crate::types::{DbId, Timestamp, UserId};

/// An owner-declared block of free time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub id: DbId,
    pub owner_id: UserId,
    pub window: TimeWindow,
    pub label: String,
    pub created_by: UserId,
    pub created_at: Timestamp,
}

/// Body of an availability submission.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SubmitAvailability {
    pub window: TimeWindow,
    #[serde(default)]
    #[validate(length(max = 120))]
    pub label: String,
}

/// What an insertion should do to the owner's set.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertPlan {
    /// The submission is identical to, or contained by, an existing window.
    /// Nothing changes; the containing window is returned to the caller.
    Unchanged(AvailabilityWindow),
    /// Insert the new window after removing the windows it strictly contains.
    Insert { supersede: Vec<DbId> },
}

/// Decide how `submitted` fits into `existing` (all windows of one owner).
///
/// - identical or contained by an existing window: [`InsertPlan::Unchanged`]
/// - strictly contains existing windows: those ids are superseded
/// - partially overlaps any window: [`CoreError::OverlapConflict`]
pub fn plan_insert(
    existing: &[AvailabilityWindow],
    submitted: &TimeWindow,
) -> Result<InsertPlan, CoreError> {
    if let Some(conflict) = existing
        .iter()
        .find(|w| w.window.partially_overlaps(submitted))
    {
        return Err(CoreError::OverlapConflict {
            existing: conflict.window,
            submitted: *submitted,
        });
    }

    if let Some(container) = existing.iter().find(|w| w.window.contains(submitted)) {
        return Ok(InsertPlan::Unchanged(container.clone()));
    }

    let supersede = existing
        .iter()
        .filter(|w| submitted.contains(&w.window))
        .map(|w| w.id)
        .collect();

    Ok(InsertPlan::Insert { supersede })
}

/// Windows that overlap `target`, ordered by start.
///
/// Lazy and restartable: cloning the iterator yields the same sequence again.
#[derive(Debug, Clone)]
pub struct WindowsOverlapping {
    windows: std::vec::IntoIter<AvailabilityWindow>,
    target: TimeWindow,
}

impl WindowsOverlapping {
    /// `windows` may come in any order; they are sorted once up front.
    pub fn new(mut windows: Vec<AvailabilityWindow>, target: TimeWindow) -> Self {
        windows.sort_by(|a, b| a.window.cmp(&b.window).then(a.id.cmp(&b.id)));
        Self {
            windows: windows.into_iter(),
            target,
        }
    }
}

impl Iterator for WindowsOverlapping {
    type Item = AvailabilityWindow;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(w) = self.windows.next() {
            if w.window.start() >= self.target.end() {
                // Sorted by start: nothing later can overlap.
                self.windows = Vec::new().into_iter();
                return None;
            }
            if w.window.overlaps(&self.target) {
                return Some(w);
            }
        }
        None
    }
}

/// `target` is inside the union of `availability` and clear of every window
/// in `busy` (owned or accepted events).
pub fn is_free<'a, B>(availability: &[AvailabilityWindow], busy: B, target: &TimeWindow) -> bool
where
    B: IntoIterator<Item = &'a TimeWindow>,
{
    union_covers(availability.iter().map(|w| &w.window), target)
        && !busy.into_iter().any(|b| b.overlaps(target))
}
