//! Half-open time windows `[start, end)`.
//!
//! [`TimeWindow`] is the value type every other module builds on. The
//! `start < end` invariant is enforced by [`TimeWindow::new`] and by the
//! `serde` deserializer, so a window that exists is always valid.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// An immutable, non-empty time range. Ordered by `(start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    start: Timestamp,
    end: Timestamp,
}

/// Unchecked wire shape, validated through `TryFrom`.
#[derive(Deserialize)]
struct RawTimeWindow {
    start: Timestamp,
    end: Timestamp,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = CoreError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        TimeWindow::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Build a window, rejecting `start >= end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self, CoreError> {
        if start >= end {
            return Err(CoreError::Validation(format!(
                "Window start ({start}) must be before end ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when the two windows share at least one instant. Touching
    /// windows (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely inside `self` (equality included).
    pub fn contains(&self, other: &TimeWindow) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// The shared sub-window, if any.
    pub fn intersection(&self, other: &TimeWindow) -> Option<TimeWindow> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then_some(TimeWindow { start, end })
    }

    /// Overlapping, but neither window contains the other.
    pub fn partially_overlaps(&self, other: &TimeWindow) -> bool {
        self.overlaps(other) && !self.contains(other) && !other.contains(self)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Returns `true` when `target` is covered by the union of `windows`.
///
/// Adjacent windows coalesce, so `[18:00, 20:00)` and `[20:00, 22:00)` together
/// cover `[19:00, 21:00)`. `windows` does not need to be sorted.
pub fn union_covers<'a, I>(windows: I, target: &TimeWindow) -> bool
where
    I: IntoIterator<Item = &'a TimeWindow>,
{
    let mut relevant: Vec<&TimeWindow> = windows
        .into_iter()
        .filter(|w| w.end >= target.start && w.start <= target.end)
        .collect();
    relevant.sort();

    let mut covered_until = target.start;
    for w in relevant {
        if w.start > covered_until {
            return false;
        }
        if w.end > covered_until {
            covered_until = w.end;
        }
        if covered_until >= target.end {
            return true;
        }
    }
    covered_until >= target.end
}
