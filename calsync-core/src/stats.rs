//! Counters reported by rule runs.

use std::fmt;
use std::ops::AddAssign;

/// What one rule did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleStats {
    pub imported: usize,
    /// Events rejected by the rule's filter.
    pub skipped: usize,
    pub deleted: usize,
    /// Orphaned all-day events left in place.
    pub kept_all_day: usize,
}

impl AddAssign for RuleStats {
    fn add_assign(&mut self, other: Self) {
        self.imported += other.imported;
        self.skipped += other.skipped;
        self.deleted += other.deleted;
        self.kept_all_day += other.kept_all_day;
    }
}

impl fmt::Display for RuleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} imported, {} skipped, {} deleted, {} kept",
            self.imported, self.skipped, self.deleted, self.kept_all_day
        )
    }
}

/// What a whole run did, rule by rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Rule description and its stats, in execution order.
    pub rules: Vec<(String, RuleStats)>,
    pub total: RuleStats,
}

impl RunStats {
    pub fn record(&mut self, rule: String, stats: RuleStats) {
        self.total += stats;
        self.rules.push((rule, stats));
    }
}
