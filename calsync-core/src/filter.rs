//! Boolean predicates deciding which events a rule acts on.
//!
//! A filter node is a mapping with exactly one key:
//!
//! ```yaml
//! filter:
//!   all_of:
//!     - summary: Your order from Amazon*
//!     - not:
//!         all_day_event: true
//! ```
//!
//! Nodes are validated when the rule is built, so evaluation itself cannot
//! fail.

use glob::Pattern;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Value")]
pub enum Filter {
    /// Matches when the event's all-day classification equals the flag.
    AllDayEvent(bool),
    /// Shell-style glob over the event summary.
    Summary(Pattern),
    Not(Box<Filter>),
    /// True if any nested filter is true. Empty list is false.
    AnyOf(Vec<Filter>),
    /// True if every nested filter is true. Empty list is true.
    AllOf(Vec<Filter>),
}

impl Filter {
    pub fn from_value(value: &Value) -> CalSyncResult<Filter> {
        let map = value.as_object().ok_or_else(|| {
            invalid(format!("expected a mapping with one key, got {}", value))
        })?;

        let mut entries = map.iter();
        let (key, data) = match (entries.next(), entries.next()) {
            (Some(entry), None) => entry,
            (None, _) => return Err(invalid("empty filter node".to_string())),
            (Some(_), Some(_)) => {
                let keys: Vec<&str> = map.keys().map(String::as_str).collect();
                return Err(invalid(format!(
                    "a filter node must have exactly one key, got [{}]",
                    keys.join(", ")
                )));
            }
        };

        match key.as_str() {
            "all_day_event" => data
                .as_bool()
                .map(Filter::AllDayEvent)
                .ok_or_else(|| invalid(format!("all_day_event expects a boolean, got {}", data))),
            "summary" => {
                let glob = data
                    .as_str()
                    .ok_or_else(|| invalid(format!("summary expects a string, got {}", data)))?;
                Pattern::new(&shell_pattern(glob))
                    .map(Filter::Summary)
                    .map_err(|e| invalid(format!("bad summary pattern \"{}\": {}", glob, e)))
            }
            "not" => Ok(Filter::Not(Box::new(Filter::from_value(data)?))),
            "any_of" => Ok(Filter::AnyOf(Self::list(key, data)?)),
            "all_of" => Ok(Filter::AllOf(Self::list(key, data)?)),
            other => Err(invalid(format!("unknown filter \"{}\"", other))),
        }
    }

    fn list(key: &str, data: &Value) -> CalSyncResult<Vec<Filter>> {
        data.as_array()
            .ok_or_else(|| invalid(format!("{} expects a list, got {}", key, data)))?
            .iter()
            .map(Filter::from_value)
            .collect()
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Filter::AllDayEvent(flag) => event.is_all_day() == *flag,
            Filter::Summary(pattern) => pattern.matches(event.summary_or_empty()),
            Filter::Not(inner) => !inner.matches(event),
            Filter::AnyOf(filters) => filters.iter().any(|f| f.matches(event)),
            Filter::AllOf(filters) => filters.iter().all(|f| f.matches(event)),
        }
    }
}

impl TryFrom<Value> for Filter {
    type Error = CalSyncError;

    fn try_from(value: Value) -> CalSyncResult<Self> {
        Filter::from_value(&value)
    }
}

/// Rewrite a shell-style pattern into one `glob::Pattern` accepts with the
/// same meaning: runs of `*` become a single `*` (there are no path
/// components in a summary) and a `[` with no closing `]` is a literal.
fn shell_pattern(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            c => out.push(c),
        }
        i += 1;
    }

    out
}

/// Index of the `]` closing the class opened at `start`. A `]` right after
/// `[` or `[!` belongs to the class.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if chars.get(i) == Some(&'!') {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    chars[i.min(chars.len())..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| i + offset)
}

fn invalid(message: String) -> CalSyncError {
    CalSyncError::InvalidFilterNode(message)
}
