pub mod calendars;
pub mod check;
pub mod run;

use anyhow::{Context, Result};
use calsync_provider_google::GoogleCalendar;

use crate::config::Config;

/// Connect to Google with the configured token file.
pub fn connect(cfg: &Config) -> Result<GoogleCalendar> {
    let token_path = cfg.google.token_path()?;

    GoogleCalendar::connect(&token_path)
        .with_context(|| format!("Failed to connect to Google with {}", token_path.display()))
}
