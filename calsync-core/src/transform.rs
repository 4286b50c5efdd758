//! Mutations applied to a copied event before it is imported.
//!
//! Text values may reference the calendar the event was copied from:
//! `$calendar_id`, `$calendar_summary` and `$calendar_name`.

use serde_json::Value;
use tracing::warn;

use crate::calendar::Calendar;
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;

#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Append `"\n\n" + text` to the description.
    DescriptionAppend(String),
}

impl Transform {
    /// Parse a transform list.
    ///
    /// Accepts a list of single-key mappings, or a single mapping whose keys
    /// are applied in document order. Unknown operations are skipped so newer
    /// configs keep working with older binaries.
    pub fn parse_list(value: &Value) -> CalSyncResult<Vec<Transform>> {
        let mut transforms = Vec::new();

        match value {
            Value::Null => {}
            Value::Object(_) => Self::parse_node(value, &mut transforms)?,
            Value::Array(items) => {
                for item in items {
                    if !item.is_object() {
                        return Err(CalSyncError::InvalidTransform(format!(
                            "expected a mapping, got {}",
                            item
                        )));
                    }
                    Self::parse_node(item, &mut transforms)?;
                }
            }
            other => {
                return Err(CalSyncError::InvalidTransform(format!(
                    "expected a list of mappings, got {}",
                    other
                )));
            }
        }

        Ok(transforms)
    }

    fn parse_node(node: &Value, out: &mut Vec<Transform>) -> CalSyncResult<()> {
        let Some(map) = node.as_object() else {
            return Ok(());
        };

        for (key, data) in map {
            match key.as_str() {
                "description_append" => {
                    let text = data.as_str().ok_or_else(|| {
                        CalSyncError::InvalidTransform(format!(
                            "description_append expects a string, got {}",
                            data
                        ))
                    })?;
                    out.push(Transform::DescriptionAppend(text.to_string()));
                }
                other => warn!(transform = other, "ignoring unsupported transform"),
            }
        }

        Ok(())
    }

    pub fn apply_to(&self, event: &mut Event, source: &Calendar) {
        match self {
            Transform::DescriptionAppend(text) => {
                let addition = substitute(text, source);
                let description = event.description.take().unwrap_or_default();
                event.description = Some(format!("{}\n\n{}", description, addition));
            }
        }
    }
}

/// Run every transform in order over the working copy.
pub fn apply(transforms: &[Transform], mut event: Event, source: &Calendar) -> Event {
    for transform in transforms {
        transform.apply_to(&mut event, source);
    }
    event
}

/// Replace `$calendar_*` variables in a single pass, so substituted values
/// are never expanded again.
pub fn substitute(text: &str, calendar: &Calendar) -> String {
    let variables = [
        ("calendar_summary", calendar.summary_or_empty()),
        ("calendar_name", calendar.name()),
        ("calendar_id", calendar.id.as_str()),
    ];

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        match variables.iter().find(|(name, _)| after.starts_with(name)) {
            Some((name, value)) => {
                out.push_str(value);
                rest = &after[name.len()..];
            }
            None => {
                out.push('$');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
