//! Per-run state shared by the dispatcher and the rule executors.

use std::cell::OnceCell;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::calendar::{self, Calendar};
use crate::error::CalSyncResult;
use crate::provider::CalendarProvider;

/// How many calendars to ask the provider for.
pub const DEFAULT_MAX_CALENDARS: u32 = 50;

/// Everything a sync run needs besides the rules themselves.
///
/// The calendar list is fetched on first use and kept for the lifetime of
/// the context. `now` is fixed at construction so every rule in a run uses
/// the same window anchor.
pub struct SyncContext<'a> {
    provider: &'a dyn CalendarProvider,
    calendars: OnceCell<Vec<Calendar>>,
    max_calendars: u32,
    now: DateTime<Utc>,
    dry_run: bool,
}

impl<'a> SyncContext<'a> {
    pub fn new(provider: &'a dyn CalendarProvider) -> Self {
        SyncContext {
            provider,
            calendars: OnceCell::new(),
            max_calendars: DEFAULT_MAX_CALENDARS,
            now: Utc::now(),
            dry_run: false,
        }
    }

    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Log imports and deletions instead of sending them.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_max_calendars(mut self, max_calendars: u32) -> Self {
        self.max_calendars = max_calendars;
        self
    }

    pub fn provider(&self) -> &dyn CalendarProvider {
        self.provider
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// The provider's calendar list, fetched once per context.
    pub fn calendars(&self) -> CalSyncResult<&[Calendar]> {
        if let Some(calendars) = self.calendars.get() {
            return Ok(calendars);
        }

        let fetched = self.provider.list_calendars(self.max_calendars)?;
        debug!(count = fetched.len(), "fetched calendar list");
        Ok(self.calendars.get_or_init(|| fetched))
    }

    pub fn resolve_calendar(&self, reference: &str) -> CalSyncResult<&Calendar> {
        calendar::resolve(self.calendars()?, reference)
    }
}
