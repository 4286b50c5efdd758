//! Calendar identity and name resolution.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CalSyncError, CalSyncResult};

/// Names that are treated as if they were absent. Providers use "Calendar"
/// as a default title, so it identifies nothing.
pub const DISALLOWED_NAMES: &[&str] = &["Calendar"];

/// A calendar as listed by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Calendar {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    /// User-configured friendly name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_override: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Calendar {
    pub fn new(id: &str, summary: &str) -> Self {
        Calendar {
            id: id.to_string(),
            summary: Some(summary.to_string()),
            ..Default::default()
        }
    }

    /// Display name: summary, then summary override, then id, skipping
    /// disallowed placeholder names.
    pub fn name(&self) -> &str {
        [self.summary.as_deref(), self.summary_override.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !is_disallowed(s))
            .unwrap_or(self.id.as_str())
    }

    pub fn summary_or_empty(&self) -> &str {
        self.summary.as_deref().unwrap_or("")
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id)
    }
}

pub fn is_disallowed(name: &str) -> bool {
    DISALLOWED_NAMES.contains(&name)
}

/// Find the calendar a config reference points at.
///
/// Matching is tried across the whole list by summary first, then by summary
/// override, then by id, so a calendar titled "work" wins over another whose
/// id happens to be "work".
pub fn resolve<'a>(calendars: &'a [Calendar], reference: &str) -> CalSyncResult<&'a Calendar> {
    if is_disallowed(reference) {
        return Err(CalSyncError::DisallowedCalendarName(reference.to_string()));
    }

    calendars
        .iter()
        .find(|c| c.summary.as_deref() == Some(reference))
        .or_else(|| {
            calendars
                .iter()
                .find(|c| c.summary_override.as_deref() == Some(reference))
        })
        .or_else(|| calendars.iter().find(|c| c.id == reference))
        .ok_or_else(|| CalSyncError::UnknownCalendar(reference.to_string()))
}
