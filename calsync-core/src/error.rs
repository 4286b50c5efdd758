//! Error types for calsync.

use thiserror::Error;

/// Errors that can occur while building or running sync rules.
#[derive(Error, Debug)]
pub enum CalSyncError {
    #[error("Unknown rule method \"{0}\" (expected \"copy\" or \"remove_deleted\")")]
    UnknownMethod(String),

    #[error("Unknown calendar \"{0}\"")]
    UnknownCalendar(String),

    #[error("Calendar reference \"{0}\" is a reserved placeholder name")]
    DisallowedCalendarName(String),

    #[error("Invalid filter: {0}")]
    InvalidFilterNode(String),

    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    #[error("Invalid duration \"{input}\": {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for calsync operations.
pub type CalSyncResult<T> = Result<T, CalSyncError>;
