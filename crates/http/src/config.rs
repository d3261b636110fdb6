//! Client configuration.

use serde::Deserialize;
use sheetsync_core::{SheetsError, SheetsResult};
use std::path::Path;

/// Base URL of the Sheets v4 REST API.
pub const DEFAULT_BASE_URL: &str = "https://sheets.googleapis.com/v4";

/// See, edit, create, and delete spreadsheets in Google Drive.
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
/// View spreadsheets.
pub const SPREADSHEETS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";
/// See, edit, create, and delete all Google Drive files.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
/// View and manage Drive files opened or created by the app.
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";
/// See and download all Drive files.
pub const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

const ENV_BASE_URL: &str = "SHEETSYNC_BASE_URL";
const ENV_ACCESS_TOKEN: &str = "SHEETSYNC_ACCESS_TOKEN";
const ENV_TIMEOUT_SECS: &str = "SHEETSYNC_TIMEOUT_SECS";

/// Settings for the HTTP request executor.
///
/// The access token is acquired elsewhere; this crate only attaches it as a
/// bearer credential.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub base_url: String,
    pub access_token: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// OAuth scopes to request when obtaining `access_token`.
    ///
    /// Informational for the external token flow; the executor never reads
    /// it. See [`ClientConfig::scope_param`].
    pub scopes: Vec<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("sheetsync/", env!("CARGO_PKG_VERSION")).to_string(),
            scopes: vec![SPREADSHEETS_SCOPE.to_string()],
        }
    }
}

impl ClientConfig {
    /// Default configuration with the given bearer token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            ..Self::default()
        }
    }

    /// Override the base URL, e.g. to target a mock server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Build a configuration from `SHEETSYNC_*` environment variables.
    pub fn from_env() -> SheetsResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> SheetsResult<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL) {
            config.base_url = url;
        }
        config.access_token = lookup(ENV_ACCESS_TOKEN);
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                SheetsError::Config(format!("{ENV_TIMEOUT_SECS} must be an integer, got {raw:?}"))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML (or JSON) configuration document.
    pub fn from_yaml_str(text: &str) -> SheetsResult<Self> {
        let config: Self =
            serde_yaml::from_str(text).map_err(|e| SheetsError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> SheetsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SheetsError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&text)
    }

    /// Scopes as the space-separated `scope` parameter of an OAuth token
    /// request.
    #[must_use]
    pub fn scope_param(&self) -> String {
        self.scopes.join(" ")
    }

    fn validate(&self) -> SheetsResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SheetsError::Config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(SheetsError::Config("timeout_secs must be positive".into()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    pub(crate) fn trimmed_base_url(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
