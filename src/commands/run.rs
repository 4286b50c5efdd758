use anyhow::{Context, Result};
use calsync_core::rule::build_rules;
use calsync_core::{RunStats, SyncContext, dispatcher};

use crate::config::Config;

pub fn run(cfg: &Config, dry_run: bool) -> Result<()> {
    // Validate everything before touching the network.
    let rules = build_rules(&cfg.rules).context("Invalid rule in config")?;

    if rules.is_empty() {
        anyhow::bail!("No rules configured.\nAdd a `rules:` list to the config file.");
    }

    let provider = super::connect(cfg)?;
    let ctx = SyncContext::new(&provider)
        .with_max_calendars(cfg.google.max_calendars)
        .with_dry_run(dry_run);

    let stats = dispatcher::run_rules(&ctx, &rules).context("Sync failed")?;

    print_summary(&stats, dry_run);
    Ok(())
}

fn print_summary(stats: &RunStats, dry_run: bool) {
    if dry_run {
        println!("Dry run, nothing was changed.");
    }
    for (rule, rule_stats) in &stats.rules {
        println!("  {}: {}", rule, rule_stats);
    }
    println!("Total: {}", stats.total);
}
