//! Time window a rule fetches events in.

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};

use crate::duration::parse_duration;
use crate::error::{CalSyncError, CalSyncResult};

pub const DEFAULT_LOOK_BACK: &str = "1 week";
pub const DEFAULT_LOOK_FORWARD: &str = "12 weeks";

/// Longest look-back or look-forward a rule may ask for.
pub const MAX_LOOK_DAYS: i64 = 100 * 366;

/// How far a rule looks around "now".
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSpec {
    pub look_back: TimeDelta,
    pub look_forward: TimeDelta,
}

impl WindowSpec {
    /// Parse the rule's duration strings, falling back to the defaults.
    pub fn from_args(look_back: Option<&str>, look_forward: Option<&str>) -> CalSyncResult<Self> {
        Ok(WindowSpec {
            look_back: bounded(look_back.unwrap_or(DEFAULT_LOOK_BACK))?,
            look_forward: bounded(look_forward.unwrap_or(DEFAULT_LOOK_FORWARD))?,
        })
    }

    /// The window around `now`. Fails instead of overflowing when either end
    /// falls outside the representable date range.
    pub fn around(&self, now: DateTime<Utc>) -> CalSyncResult<TimeWindow> {
        let from = now
            .checked_sub_signed(self.look_back)
            .ok_or_else(|| out_of_range(self.look_back))?;
        let to = now
            .checked_add_signed(self.look_forward)
            .ok_or_else(|| out_of_range(self.look_forward))?;
        Ok(TimeWindow { from, to })
    }
}

fn bounded(input: &str) -> CalSyncResult<TimeDelta> {
    let delta = parse_duration(input)?;
    if delta > TimeDelta::days(MAX_LOOK_DAYS) {
        return Err(CalSyncError::InvalidDuration {
            input: input.to_string(),
            reason: "longer than 100 years".to_string(),
        });
    }
    Ok(delta)
}

fn out_of_range(delta: TimeDelta) -> CalSyncError {
    CalSyncError::InvalidDuration {
        input: format!("{}s", delta.num_seconds()),
        reason: "window end is out of range".to_string(),
    }
}

impl Default for WindowSpec {
    fn default() -> Self {
        WindowSpec {
            look_back: TimeDelta::weeks(1),
            look_forward: TimeDelta::weeks(12),
        }
    }
}

/// Concrete `[from, to]` range, both ends in UTC.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// `from` as RFC3339 with a trailing `Z`.
    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// `to` as RFC3339 with a trailing `Z`.
    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
