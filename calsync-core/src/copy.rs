//! `copy` rules: replicate source events into the destination calendar.

use tracing::{debug, error, info};

use crate::calendar::Calendar;
use crate::context::SyncContext;
use crate::error::CalSyncResult;
use crate::event::Event;
use crate::provider::EventQuery;
use crate::rule::Rule;
use crate::stats::RuleStats;

/// Copy every event in the rule's window from each source into the
/// destination.
///
/// No matching against existing destination events is done: running the same
/// rule twice imports everything twice, and the provider's import semantics
/// decide whether that creates duplicates. The first failing event aborts the
/// rule after being logged.
pub fn run(ctx: &SyncContext, rule: &Rule) -> CalSyncResult<RuleStats> {
    let sources = rule
        .sources
        .iter()
        .map(|reference| ctx.resolve_calendar(reference))
        .collect::<CalSyncResult<Vec<_>>>()?;
    let destination = ctx.resolve_calendar(&rule.destination)?;

    let window = rule.window.around(ctx.now())?;
    let query = EventQuery::instances(window);

    info!(
        rule = %rule,
        from = %window.from_rfc3339(),
        to = %window.to_rfc3339(),
        "running copy rule"
    );

    let mut stats = RuleStats::default();

    for source in sources {
        let events = ctx.provider().list_events(&source.id, &query)?;
        debug!(source = %source, count = events.len(), "fetched source events");

        for event in &events {
            if let Err(e) = copy_event(ctx, rule, source, destination, event, &mut stats) {
                error!(rule = %rule, event = %event, "failed to copy event: {}", e);
                return Err(e);
            }
        }
    }

    info!(rule = %rule, %stats, "copy rule finished");
    Ok(stats)
}

fn copy_event(
    ctx: &SyncContext,
    rule: &Rule,
    source: &Calendar,
    destination: &Calendar,
    event: &Event,
    stats: &mut RuleStats,
) -> CalSyncResult<()> {
    if !rule.accepts(event) {
        debug!(event = %event, "skipped by filter");
        stats.skipped += 1;
        return Ok(());
    }

    let copy = rule.build_copy(event, source);

    if ctx.is_dry_run() {
        info!(destination = %destination, event = %copy, "would import");
    } else {
        let stored = ctx.provider().import_event(&destination.id, &copy)?;
        info!(destination = %destination, event = %stored, "imported");
    }

    stats.imported += 1;
    Ok(())
}
