//! `remove_deleted` rules: delete copies whose source event is gone.
//!
//! The plan is computed without touching the provider and applied afterwards,
//! so a dry run and a real run see exactly the same decisions.

use tracing::{debug, error, info, warn};

use crate::calendar::Calendar;
use crate::context::SyncContext;
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;
use crate::provider::EventQuery;
use crate::rule::Rule;
use crate::stats::RuleStats;

/// A source event together with the calendar it was read from.
pub struct SourceEvent<'a> {
    pub event: Event,
    pub calendar: &'a Calendar,
}

/// What reconciliation would do to the destination.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    /// Destination events with no source counterpart.
    pub to_delete: Vec<Event>,
    /// Orphaned all-day events left alone.
    pub to_keep: Vec<Event>,
    /// Destination events that still have a source.
    pub matched: usize,
}

impl ReconcilePlan {
    /// Compare the destination against the union of the source calendars.
    ///
    /// A destination event is matched when its writable fields equal what the
    /// rule would produce for some source event. Matching is quadratic in the
    /// number of events, which is fine for windows of a few months.
    pub fn compute(rule: &Rule, sources: &[SourceEvent], destination: &[Event]) -> Self {
        let expected: Vec<Event> = sources
            .iter()
            .map(|s| rule.expected_copy(&s.event, s.calendar))
            .collect();

        let mut plan = ReconcilePlan::default();

        for event in destination {
            let projected = event.to_copy();
            if expected.iter().any(|e| *e == projected) {
                plan.matched += 1;
            } else if event.is_all_day() {
                plan.to_keep.push(event.clone());
            } else {
                plan.to_delete.push(event.clone());
            }
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty()
    }

    /// Delete the planned events. The first failure is logged and returned.
    pub fn apply(
        &self,
        ctx: &SyncContext,
        rule: &Rule,
        destination: &Calendar,
    ) -> CalSyncResult<RuleStats> {
        let mut stats = RuleStats {
            kept_all_day: self.to_keep.len(),
            ..Default::default()
        };

        for event in &self.to_keep {
            warn!(
                destination = %destination,
                event = %event,
                "all-day event has no source, keeping it"
            );
        }

        for event in &self.to_delete {
            if let Err(e) = delete(ctx, destination, event) {
                error!(rule = %rule, event = %event, "failed to delete event: {}", e);
                return Err(e);
            }
            stats.deleted += 1;
        }

        Ok(stats)
    }
}

fn delete(ctx: &SyncContext, destination: &Calendar, event: &Event) -> CalSyncResult<()> {
    let id = event.id.as_deref().ok_or_else(|| {
        CalSyncError::Provider(format!("destination event has no id: {}", event))
    })?;

    if ctx.is_dry_run() {
        info!(destination = %destination, event = %event, "would delete");
        return Ok(());
    }

    ctx.provider().delete_event(&destination.id, id)?;
    info!(destination = %destination, event = %event, "deleted");
    Ok(())
}

/// Delete destination events in the window that no source event explains.
///
/// Sources and destination are both listed as stored records, with recurring
/// events left unexpanded.
pub fn run(ctx: &SyncContext, rule: &Rule) -> CalSyncResult<RuleStats> {
    let sources = rule
        .sources
        .iter()
        .map(|reference| ctx.resolve_calendar(reference))
        .collect::<CalSyncResult<Vec<_>>>()?;
    let destination = ctx.resolve_calendar(&rule.destination)?;

    let window = rule.window.around(ctx.now())?;
    let query = EventQuery::records(window);

    info!(
        rule = %rule,
        from = %window.from_rfc3339(),
        to = %window.to_rfc3339(),
        "running remove_deleted rule"
    );

    let mut source_events = Vec::new();
    for calendar in sources {
        let events = ctx.provider().list_events(&calendar.id, &query)?;
        debug!(source = %calendar, count = events.len(), "fetched source events");
        source_events.extend(events.into_iter().map(|event| SourceEvent { event, calendar }));
    }

    let destination_events = ctx.provider().list_events(&destination.id, &query)?;
    debug!(
        destination = %destination,
        count = destination_events.len(),
        "fetched destination events"
    );

    let plan = ReconcilePlan::compute(rule, &source_events, &destination_events);
    debug!(
        matched = plan.matched,
        to_delete = plan.to_delete.len(),
        to_keep = plan.to_keep.len(),
        "reconciliation plan"
    );

    let stats = plan.apply(ctx, rule, destination)?;
    info!(rule = %rule, %stats, "remove_deleted rule finished");
    Ok(stats)
}
