//! The calendar back-end the rule engine talks to.
//!
//! Every call blocks until the provider answers. Implementations own
//! transport, credentials and any retry policy; the engine never retries.

use std::fmt;

use crate::calendar::Calendar;
use crate::error::CalSyncResult;
use crate::event::Event;
use crate::window::TimeWindow;

/// Sort order for event listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    StartTime,
    Updated,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::StartTime => "startTime",
            OrderBy::Updated => "updated",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of an event listing.
#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub window: TimeWindow,
    /// Expand recurring events into their instances.
    pub single_events: bool,
    pub order_by: OrderBy,
}

impl EventQuery {
    /// One record per occurrence, in start order. Used when copying.
    pub fn instances(window: TimeWindow) -> Self {
        EventQuery {
            window,
            single_events: true,
            order_by: OrderBy::StartTime,
        }
    }

    /// Stored records as-is (recurring masters included), most recently
    /// updated last. Used when reconciling.
    pub fn records(window: TimeWindow) -> Self {
        EventQuery {
            window,
            single_events: false,
            order_by: OrderBy::Updated,
        }
    }
}

pub trait CalendarProvider {
    fn list_calendars(&self, max_results: u32) -> CalSyncResult<Vec<Calendar>>;

    fn list_events(&self, calendar_id: &str, query: &EventQuery) -> CalSyncResult<Vec<Event>>;

    /// Insert the event, or adopt an existing one carrying the same external
    /// identifier. Returns the stored record.
    fn import_event(&self, calendar_id: &str, event: &Event) -> CalSyncResult<Event>;

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalSyncResult<()>;
}
