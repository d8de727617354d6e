//! Schedule reconciliation: merge, deduplicate and conflict-annotate a user's
//! availability, events and external calendar entries.
//!
//! [`reconcile`] is a pure function. Fetching the inputs (and degrading when
//! the external calendar is unreachable) is the engine's job.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::availability::AvailabilityWindow;
use crate::calendar::{CalendarOrigin, ExternalCalendarEvent};
use crate::event::Event;
use crate::time_window::TimeWindow;
use crate::types::{DbId, UserId};

/// Everything the merge needs for one user.
#[derive(Debug, Clone, Default)]
pub struct ScheduleInputs {
    pub availability: Vec<AvailabilityWindow>,
    pub owned: Vec<Event>,
    pub accepted: Vec<Event>,
    pub external: Vec<ExternalCalendarEvent>,
    /// Keep external entries that were not written by the platform.
    pub include_foreign: bool,
}

/// How the user relates to an event in their schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventRole {
    Owner,
    Accepted,
}

/// One entry of the merged schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScheduleItem {
    Event { role: EventRole, event: Event },
    Availability { availability: AvailabilityWindow },
    External { entry: ExternalCalendarEvent },
}

impl ScheduleItem {
    pub fn window(&self) -> &TimeWindow {
        match self {
            ScheduleItem::Event { event, .. } => &event.window,
            ScheduleItem::Availability { availability } => &availability.window,
            ScheduleItem::External { entry } => &entry.window,
        }
    }

    /// Tie-break rank at equal start: concrete bookings first.
    fn precedence(&self) -> u8 {
        match self {
            ScheduleItem::Event { .. } => 0,
            ScheduleItem::Availability { .. } => 1,
            ScheduleItem::External { .. } => 2,
        }
    }

    pub fn item_ref(&self) -> ItemRef {
        match self {
            ScheduleItem::Event { event, .. } => ItemRef::Event { id: event.id },
            ScheduleItem::Availability { availability } => {
                ItemRef::Availability { id: availability.id }
            }
            ScheduleItem::External { entry } => ItemRef::External {
                external_id: entry.external_id.clone(),
            },
        }
    }
}

/// Stable reference to a schedule item, used in conflict reports.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemRef {
    Event { id: DbId },
    Availability { id: DbId },
    External { external_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// An event overlaps a declared availability window.
    EventAvailability,
    /// Two events the user is committed to overlap.
    DoubleBooking,
}

/// Two overlapping schedule items. `first` precedes `second` in the merged order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub first: ItemRef,
    pub second: ItemRef,
    pub overlap: TimeWindow,
}

/// Outcome of the external calendar fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExternalStatus {
    /// Entries were fetched and merged.
    Included,
    /// No calendar credential was supplied.
    Skipped,
    /// The provider failed or timed out; the schedule holds platform data only.
    Unavailable { reason: String },
}

/// A user's merged, conflict-annotated schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schedule {
    pub owner_id: UserId,
    pub items: Vec<ScheduleItem>,
    pub conflicts: Vec<Conflict>,
    pub external_status: ExternalStatus,
}

/// Merge the inputs into one ordered, deduplicated schedule.
pub fn reconcile(
    owner_id: UserId,
    inputs: ScheduleInputs,
    external_status: ExternalStatus,
) -> Schedule {
    // Owned wins over accepted when the same event shows up in both.
    let mut events: BTreeMap<DbId, (EventRole, Event)> = BTreeMap::new();
    for event in inputs.accepted {
        events.insert(event.id, (EventRole::Accepted, event));
    }
    for event in inputs.owned {
        events.insert(event.id, (EventRole::Owner, event));
    }

    let mut seen_external = HashSet::new();
    let external = inputs.external.into_iter().filter(|entry| {
        let mirrored = entry.cross_ref.is_some_and(|id| events.contains_key(&id));
        let wanted = inputs.include_foreign || entry.origin == CalendarOrigin::Platform;
        !mirrored && wanted && seen_external.insert(entry.external_id.clone())
    });
    let external: Vec<ScheduleItem> = external
        .map(|entry| ScheduleItem::External { entry })
        .collect();

    let mut items: Vec<ScheduleItem> = events
        .into_values()
        .map(|(role, event)| ScheduleItem::Event { role, event })
        .chain(
            inputs
                .availability
                .into_iter()
                .map(|availability| ScheduleItem::Availability { availability }),
        )
        .chain(external)
        .collect();
    items.sort_by(compare_items);

    let conflicts = find_conflicts(&items);

    Schedule {
        owner_id,
        items,
        conflicts,
        external_status,
    }
}

fn compare_items(a: &ScheduleItem, b: &ScheduleItem) -> Ordering {
    a.window()
        .start()
        .cmp(&b.window().start())
        .then(a.precedence().cmp(&b.precedence()))
        .then(a.window().end().cmp(&b.window().end()))
        .then_with(|| a.item_ref().cmp(&b.item_ref()))
}

/// Sweep over start-ordered items, pairing each with the still-open ones.
fn find_conflicts(items: &[ScheduleItem]) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    let mut open: Vec<&ScheduleItem> = Vec::new();

    for item in items {
        if matches!(item, ScheduleItem::External { .. }) {
            continue;
        }
        let start = item.window().start();
        open.retain(|o| o.window().end() > start);

        for earlier in &open {
            let kind = match (earlier, item) {
                (ScheduleItem::Event { .. }, ScheduleItem::Event { .. }) => {
                    ConflictKind::DoubleBooking
                }
                (ScheduleItem::Event { .. }, ScheduleItem::Availability { .. })
                | (ScheduleItem::Availability { .. }, ScheduleItem::Event { .. }) => {
                    ConflictKind::EventAvailability
                }
                _ => continue,
            };
            if let Some(overlap) = earlier.window().intersection(item.window()) {
                conflicts.push(Conflict {
                    kind,
                    first: earlier.item_ref(),
                    second: item.item_ref(),
                    overlap,
                });
            }
        }
        open.push(item);
    }

    conflicts
}
