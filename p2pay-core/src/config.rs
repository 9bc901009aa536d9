//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "api": { "baseUrl": "http://localhost:8000", "timeoutSecs": 30 }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::http::{normalize_base_url, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

/// Environment variable overriding the configured API URL
pub const API_URL_ENV: &str = "P2PAY_API_URL";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api: ApiSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout_secs: u64,
    /// Set when `P2PAY_API_URL` overrode the file
    pub api_url_from_env: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_url_from_env: false,
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing or malformed settings file yields defaults. The API URL can
    /// be overridden with `P2PAY_API_URL`.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = match read_settings(data_dir) {
            Ok(raw) => raw,
            Err(ReadError::Malformed(_)) => SettingsFile::default(),
            Err(ReadError::Io(e)) => return Err(e),
        };

        let (api_url, api_url_from_env) = match std::env::var(API_URL_ENV).ok() {
            Some(url) if !url.trim().is_empty() => (url, true),
            _ => (
                raw.api
                    .base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                false,
            ),
        };

        Ok(Self {
            api_url,
            timeout_secs: raw
                .api
                .timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            api_url_from_env,
        })
    }

    /// Save config to the data directory
    ///
    /// An API URL that came from the environment is not written back. A
    /// malformed settings file is left untouched and reported instead.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");
        let mut settings = read_settings(data_dir).map_err(|e| match e {
            ReadError::Malformed(e) => anyhow::anyhow!(
                "{} is not valid JSON ({}); fix or remove it before changing settings",
                settings_path.display(),
                e
            ),
            ReadError::Io(e) => e,
        })?;

        if !self.api_url_from_env {
            settings.api.base_url = Some(self.api_url.clone());
        }
        settings.api.timeout_secs = Some(self.timeout_secs);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }

    /// Set the API URL after validating it
    pub fn set_api_url(&mut self, url: &str) -> Result<()> {
        self.api_url = normalize_base_url(url)?;
        self.api_url_from_env = false;
        Ok(())
    }

    /// Set the request timeout
    pub fn set_timeout_secs(&mut self, secs: u64) -> Result<()> {
        if secs == 0 {
            anyhow::bail!("Timeout must be at least one second");
        }
        self.timeout_secs = secs;
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

enum ReadError {
    Io(anyhow::Error),
    Malformed(serde_json::Error),
}

fn read_settings(data_dir: &Path) -> std::result::Result<SettingsFile, ReadError> {
    let settings_path = data_dir.join("settings.json");
    if !settings_path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(&settings_path)
        .with_context(|| format!("Failed to read {}", settings_path.display()))
        .map_err(ReadError::Io)?;
    serde_json::from_str(&content).map_err(ReadError::Malformed)
}
