//! Gigify domain core.
//!
//! Pure scheduling logic for the availability and event reconciliation
//! engine: time windows, interval-set planning, event validation, calendar
//! cross-references, schedule merging and search filters. No I/O lives here;
//! persistence is reached through the [`store::ScheduleStore`] trait.

pub mod availability;
pub mod calendar;
pub mod error;
pub mod event;
pub mod geo;
pub mod schedule;
pub mod search;
pub mod store;
pub mod time_window;
pub mod types;
