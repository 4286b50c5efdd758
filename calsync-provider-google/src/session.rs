//! Loads the OAuth token file and refreshes the access token when expired.

use std::path::{Path, PathBuf};

use calsync_core::{CalSyncError, CalSyncResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Authorized-user token file, as written by Google's client libraries.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenFile {
    pub token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,

    /// Anything else the writer put there, kept on save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl TokenFile {
    /// Tokens without an expiry are assumed valid.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|expiry| now >= expiry)
    }

    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some() && self.client_id.is_some() && self.client_secret.is_some()
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: i64,
}

/// A token file on disk and its parsed contents.
pub struct Session {
    path: PathBuf,
    data: TokenFile,
}

impl Session {
    pub fn load(path: &Path) -> CalSyncResult<Self> {
        if !path.exists() {
            return Err(CalSyncError::Config(format!(
                "Google token file not found at {}",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CalSyncError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let data: TokenFile = serde_json::from_str(&contents).map_err(|e| {
            CalSyncError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })?;

        Ok(Session {
            path: path.to_path_buf(),
            data,
        })
    }

    /// Load the token file and refresh it once if it has expired.
    pub fn load_valid(path: &Path, http: &reqwest::blocking::Client) -> CalSyncResult<Self> {
        let mut session = Self::load(path)?;

        if session.data.is_expired(Utc::now()) {
            if !session.data.can_refresh() {
                return Err(CalSyncError::Config(format!(
                    "Google token in {} has expired and cannot be refreshed",
                    path.display()
                )));
            }
            session.refresh(http)?;
        } else {
            debug!(path = %path.display(), "using stored access token");
        }

        Ok(session)
    }

    pub fn access_token(&self) -> &str {
        &self.data.token
    }

    fn refresh(&mut self, http: &reqwest::blocking::Client) -> CalSyncResult<()> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", self.data.refresh_token.as_deref().unwrap_or_default()),
            ("client_id", self.data.client_id.as_deref().unwrap_or_default()),
            ("client_secret", self.data.client_secret.as_deref().unwrap_or_default()),
        ];

        let response = http
            .post(&self.data.token_uri)
            .form(&form)
            .send()
            .map_err(|e| CalSyncError::Provider(format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(CalSyncError::Provider(format!(
                "Failed to refresh token ({}): {}",
                status, body
            )));
        }

        let refreshed: RefreshResponse = response.json().map_err(|e| {
            CalSyncError::Provider(format!("Failed to parse token refresh response: {}", e))
        })?;

        self.data.token = refreshed.access_token;
        self.data.expiry = Some(Utc::now() + Duration::seconds(refreshed.expires_in));
        self.save()?;

        info!(path = %self.path.display(), "refreshed Google access token");
        Ok(())
    }

    fn save(&self) -> CalSyncResult<()> {
        let contents = serde_json::to_string_pretty(&self.data)
            .map_err(|e| CalSyncError::Config(format!("Failed to serialize token: {}", e)))?;

        std::fs::write(&self.path, contents).map_err(|e| {
            CalSyncError::Config(format!("Failed to write {}: {}", self.path.display(), e))
        })?;

        // Owner-only, the file holds OAuth tokens.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).map_err(
                |e| {
                    CalSyncError::Config(format!(
                        "Failed to set permissions on {}: {}",
                        self.path.display(),
                        e
                    ))
                },
            )?;
        }

        Ok(())
    }
}
