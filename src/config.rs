// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CLOUD_HEALTH_API_URL` | Backend base URL, including `/api/v1` | `http://localhost:8000/api/v1` |
//! | `CLOUD_HEALTH_DATA_DIR` | Directory for the persisted session database | `$HOME/.cloud-health` |
//! | `CLOUD_HEALTH_REFRESH_SECS` | Dashboard auto-refresh interval | `300` |
//! | `CLOUD_HEALTH_TIMEOUT_SECS` | Per-request HTTP timeout | `30` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `warn,cloud_health=info` |

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const API_URL_ENV: &str = "CLOUD_HEALTH_API_URL";
pub const DATA_DIR_ENV: &str = "CLOUD_HEALTH_DATA_DIR";
pub const REFRESH_SECS_ENV: &str = "CLOUD_HEALTH_REFRESH_SECS";
pub const TIMEOUT_SECS_ENV: &str = "CLOUD_HEALTH_TIMEOUT_SECS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Local development backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Dashboard auto-refresh interval (five minutes).
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// File name of the redb database inside the data directory.
pub const STORE_FILE_NAME: &str = "client.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL without trailing slash.
    pub api_base_url: String,
    pub data_dir: PathBuf,
    pub refresh_interval: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            data_dir: default_data_dir(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_base_url = normalize_base_url(&env_or_default(API_URL_ENV, DEFAULT_API_URL))?;
        let data_dir = env_optional(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        let refresh_interval =
            env_secs(REFRESH_SECS_ENV)?.unwrap_or(DEFAULT_REFRESH_INTERVAL);
        let request_timeout = env_secs(TIMEOUT_SECS_ENV)?.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self {
            api_base_url,
            data_dir,
            refresh_interval,
            request_timeout,
        })
    }

    /// Replace the base URL (e.g. from a command-line flag).
    pub fn with_api_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.api_base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

/// Validate an absolute http(s) URL and strip trailing slashes.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::Invalid {
        name: API_URL_ENV,
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            name: API_URL_ENV,
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn default_data_dir() -> PathBuf {
    match env_optional("HOME") {
        Some(home) => PathBuf::from(home).join(".cloud-health"),
        None => PathBuf::from(".cloud-health"),
    }
}

fn env_secs(name: &'static str) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = env_optional(name) else {
        return Ok(None);
    };
    parse_secs(name, &raw).map(Some)
}

fn parse_secs(name: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
        name,
        reason: format!("'{raw}' is not a whole number of seconds"),
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    env_optional(name).unwrap_or_else(|| default.to_string())
}
