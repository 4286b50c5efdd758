//! In-memory provider for unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::calendar::Calendar;
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;
use crate::provider::{CalendarProvider, EventQuery};

/// Keeps events per calendar id and records every call.
///
/// Listings ignore the query window and return the calendar's events in
/// insertion order.
pub struct MemoryProvider {
    calendars: Vec<Calendar>,
    events: RefCell<HashMap<String, Vec<Event>>>,
    queries: RefCell<Vec<(String, EventQuery)>>,
    imports: RefCell<Vec<(String, Event)>>,
    deletes: RefCell<Vec<(String, String)>>,
    list_calendar_calls: Cell<usize>,
    writes: Cell<usize>,
    fail_on_write: Cell<Option<usize>>,
    next_id: Cell<usize>,
}

impl MemoryProvider {
    pub fn new(calendars: Vec<Calendar>) -> Self {
        MemoryProvider {
            calendars,
            events: RefCell::new(HashMap::new()),
            queries: RefCell::new(Vec::new()),
            imports: RefCell::new(Vec::new()),
            deletes: RefCell::new(Vec::new()),
            list_calendar_calls: Cell::new(0),
            writes: Cell::new(0),
            fail_on_write: Cell::new(None),
            next_id: Cell::new(1),
        }
    }

    /// Seed a calendar with events, bypassing the call log.
    pub fn with_events(self, calendar_id: &str, events: Vec<Event>) -> Self {
        self.events
            .borrow_mut()
            .entry(calendar_id.to_string())
            .or_default()
            .extend(events);
        self
    }

    /// Make the n-th import or delete (1-based) fail.
    pub fn fail_on_write(&self, n: usize) {
        self.fail_on_write.set(Some(n));
    }

    pub fn events(&self, calendar_id: &str) -> Vec<Event> {
        self.events
            .borrow()
            .get(calendar_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn queries(&self) -> Vec<(String, EventQuery)> {
        self.queries.borrow().clone()
    }

    /// Import bodies as sent, per destination calendar id.
    pub fn imports(&self) -> Vec<(String, Event)> {
        self.imports.borrow().clone()
    }

    pub fn imports_into(&self, calendar_id: &str) -> Vec<Event> {
        self.imports
            .borrow()
            .iter()
            .filter(|(id, _)| id == calendar_id)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn deletes(&self) -> Vec<(String, String)> {
        self.deletes.borrow().clone()
    }

    pub fn list_calendar_calls(&self) -> usize {
        self.list_calendar_calls.get()
    }

    fn check_write(&self) -> CalSyncResult<()> {
        let n = self.writes.get() + 1;
        self.writes.set(n);
        if self.fail_on_write.get() == Some(n) {
            return Err(CalSyncError::Provider(format!("injected failure on write {}", n)));
        }
        Ok(())
    }
}

impl CalendarProvider for MemoryProvider {
    fn list_calendars(&self, _max_results: u32) -> CalSyncResult<Vec<Calendar>> {
        self.list_calendar_calls.set(self.list_calendar_calls.get() + 1);
        Ok(self.calendars.clone())
    }

    fn list_events(&self, calendar_id: &str, query: &EventQuery) -> CalSyncResult<Vec<Event>> {
        self.queries
            .borrow_mut()
            .push((calendar_id.to_string(), query.clone()));
        Ok(self.events(calendar_id))
    }

    fn import_event(&self, calendar_id: &str, event: &Event) -> CalSyncResult<Event> {
        self.check_write()?;
        self.imports
            .borrow_mut()
            .push((calendar_id.to_string(), event.clone()));

        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let mut stored = event.clone();
        stored.id = Some(format!("imported-{}", id));
        stored
            .extra
            .insert("etag".into(), serde_json::json!(format!("\"etag-{}\"", id)));

        self.events
            .borrow_mut()
            .entry(calendar_id.to_string())
            .or_default()
            .push(stored.clone());
        Ok(stored)
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> CalSyncResult<()> {
        self.check_write()?;
        self.deletes
            .borrow_mut()
            .push((calendar_id.to_string(), event_id.to_string()));

        let mut events = self.events.borrow_mut();
        let list = events.entry(calendar_id.to_string()).or_default();
        let before = list.len();
        list.retain(|e| e.id.as_deref() != Some(event_id));

        if list.len() == before {
            return Err(CalSyncError::Provider(format!(
                "event {} not found in {}",
                event_id, calendar_id
            )));
        }
        Ok(())
    }
}
