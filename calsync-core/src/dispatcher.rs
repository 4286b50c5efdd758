//! Runs rules in order against one provider.

use tracing::info;

use crate::context::SyncContext;
use crate::error::CalSyncResult;
use crate::rule::{self, Rule, RuleConfig, RuleMethod};
use crate::stats::{RuleStats, RunStats};
use crate::{copy, reconcile};

pub fn run_rule(ctx: &SyncContext, rule: &Rule) -> CalSyncResult<RuleStats> {
    match rule.method {
        RuleMethod::Copy => copy::run(ctx, rule),
        RuleMethod::RemoveDeleted => reconcile::run(ctx, rule),
    }
}

/// Run each rule to completion before starting the next one, so later rules
/// see what earlier ones wrote. Stops at the first failing rule.
pub fn run_rules(ctx: &SyncContext, rules: &[Rule]) -> CalSyncResult<RunStats> {
    let mut stats = RunStats::default();

    for (i, rule) in rules.iter().enumerate() {
        info!(index = i + 1, total = rules.len(), rule = %rule, "starting rule");
        let rule_stats = run_rule(ctx, rule)?;
        stats.record(rule.to_string(), rule_stats);
    }

    info!(rules = rules.len(), total = %stats.total, "sync finished");
    Ok(stats)
}

/// Validate every rule, then run them. A config error anywhere means nothing
/// is read or written.
pub fn run_configs(ctx: &SyncContext, configs: &[RuleConfig]) -> CalSyncResult<RunStats> {
    let rules = rule::build_rules(configs)?;
    run_rules(ctx, &rules)
}
