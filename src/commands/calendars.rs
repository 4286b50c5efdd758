use anyhow::{Context, Result};
use calsync_core::{Calendar, CalendarProvider};

use crate::config::Config;

pub fn run(cfg: &Config) -> Result<()> {
    let provider = super::connect(cfg)?;
    let calendars = provider
        .list_calendars(cfg.google.max_calendars)
        .context("Failed to list calendars")?;

    if calendars.is_empty() {
        println!("No calendars found.");
        return Ok(());
    }

    for calendar in &calendars {
        println!("{}", describe(calendar));
    }

    Ok(())
}

fn describe(calendar: &Calendar) -> String {
    let mut line = format!("{}\n    id: {}", calendar.name(), calendar.id);
    if let Some(summary) = &calendar.summary {
        line.push_str(&format!("\n    summary: {}", summary));
    }
    if let Some(summary_override) = &calendar.summary_override {
        line.push_str(&format!("\n    summaryOverride: {}", summary_override));
    }
    line
}
