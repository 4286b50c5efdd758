//! Rule engine for calsync.
//!
//! This crate knows nothing about any particular calendar service:
//! - `CalendarProvider` is the seam a service implements
//! - `Rule` / `RuleConfig` describe what to sync
//! - `dispatcher` runs a rule list against a `SyncContext`

pub mod calendar;
pub mod context;
pub mod copy;
pub mod dispatcher;
pub mod duration;
pub mod error;
pub mod event;
pub mod filter;
pub mod provider;
pub mod reconcile;
pub mod rule;
pub mod stats;
pub mod transform;
pub mod window;

#[cfg(test)]
mod testing;

pub use calendar::Calendar;
pub use context::SyncContext;
pub use dispatcher::{run_configs, run_rule, run_rules};
pub use error::{CalSyncError, CalSyncResult};
pub use event::{Event, EventTime};
pub use filter::Filter;
pub use provider::{CalendarProvider, EventQuery, OrderBy};
pub use rule::{Rule, RuleConfig, RuleMethod};
pub use stats::{RuleStats, RunStats};
pub use transform::Transform;
pub use window::{TimeWindow, WindowSpec};
