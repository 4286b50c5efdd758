//! Rule definitions: the raw config record and its validated form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::calendar::Calendar;
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;
use crate::filter::Filter;
use crate::transform::{self, Transform};
use crate::window::WindowSpec;

/// A rule as written in the config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<CalendarRefs>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_back: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub look_forward: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_copy: Option<bool>,
}

/// One calendar reference or several.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalendarRefs {
    One(String),
    Many(Vec<String>),
}

impl CalendarRefs {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            CalendarRefs::One(reference) => vec![reference.clone()],
            CalendarRefs::Many(references) => references.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMethod {
    /// Replicate filtered, transformed events into the destination.
    Copy,
    /// Delete destination events whose source has gone.
    RemoveDeleted,
}

impl FromStr for RuleMethod {
    type Err = CalSyncError;

    fn from_str(s: &str) -> CalSyncResult<Self> {
        match s {
            "copy" => Ok(RuleMethod::Copy),
            "remove_deleted" => Ok(RuleMethod::RemoveDeleted),
            other => Err(CalSyncError::UnknownMethod(other.to_string())),
        }
    }
}

impl fmt::Display for RuleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleMethod::Copy => write!(f, "copy"),
            RuleMethod::RemoveDeleted => write!(f, "remove_deleted"),
        }
    }
}

/// A validated rule, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub method: RuleMethod,
    pub sources: Vec<String>,
    pub destination: String,
    pub window: WindowSpec,
    pub filter: Option<Filter>,
    pub transforms: Vec<Transform>,
    pub private_copy: bool,
}

impl Rule {
    pub fn new(method: RuleMethod, src: &str, dst: &str) -> Self {
        Rule {
            method,
            sources: vec![src.to_string()],
            destination: dst.to_string(),
            window: WindowSpec::default(),
            filter: None,
            transforms: Vec::new(),
            private_copy: true,
        }
    }

    pub fn from_config(config: &RuleConfig) -> CalSyncResult<Self> {
        let method: RuleMethod = config.method.parse()?;

        let sources = config
            .src
            .as_ref()
            .map(CalendarRefs::to_vec)
            .ok_or_else(|| CalSyncError::InvalidRule(format!("{} rule has no src", method)))?;
        if sources.is_empty() {
            return Err(CalSyncError::InvalidRule(format!(
                "{} rule has an empty src list",
                method
            )));
        }

        let destination = config
            .dst
            .clone()
            .ok_or_else(|| CalSyncError::InvalidRule(format!("{} rule has no dst", method)))?;

        let window =
            WindowSpec::from_args(config.look_back.as_deref(), config.look_forward.as_deref())?;

        let filter = config.filter.as_ref().map(Filter::from_value).transpose()?;

        let transforms = match &config.transform {
            Some(value) => Transform::parse_list(value)?,
            None => Vec::new(),
        };

        Ok(Rule {
            method,
            sources,
            destination,
            window,
            filter,
            transforms,
            private_copy: config.private_copy.unwrap_or(true),
        })
    }

    /// Whether the rule's filter (if any) lets the event through.
    pub fn accepts(&self, event: &Event) -> bool {
        self.filter.as_ref().is_none_or(|f| f.matches(event))
    }

    /// The event this rule would write for `event` read from `source`, minus
    /// the private-copy flag. Reconciliation compares destination events
    /// against this.
    pub fn expected_copy(&self, event: &Event, source: &Calendar) -> Event {
        transform::apply(&self.transforms, event.to_copy(), source)
    }

    /// The import body for `event` read from `source`.
    pub fn build_copy(&self, event: &Event, source: &Calendar) -> Event {
        let mut copy = event.to_copy();
        if self.private_copy {
            copy.private_copy = Some(true);
        }
        transform::apply(&self.transforms, copy, source)
    }
}

impl TryFrom<&RuleConfig> for Rule {
    type Error = CalSyncError;

    fn try_from(config: &RuleConfig) -> CalSyncResult<Self> {
        Rule::from_config(config)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] -> {}",
            self.method,
            self.sources.join(", "),
            self.destination
        )
    }
}

/// Validate a whole rule list. Nothing runs unless every rule is valid.
pub fn build_rules(configs: &[RuleConfig]) -> CalSyncResult<Vec<Rule>> {
    configs.iter().map(Rule::from_config).collect()
}
