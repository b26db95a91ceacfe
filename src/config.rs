//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_STORAGE_PATH: &str = ".authgate/session.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API base URL must not be empty")]
    EmptyApiUrl,
    #[error("API base URL must start with http:// or https://: {0}")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl HttpTimeouts {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_secs: env_parse_u64("AUTHGATE_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("AUTHGATE_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    pub storage_path: PathBuf,
    pub timeouts: HttpTimeouts,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `AUTHGATE_API_URL`: default `http://localhost:8000`
    /// - `AUTHGATE_STORAGE_PATH`: default `.authgate/session.json`
    /// - `AUTHGATE_REQUEST_TIMEOUT_SECS`: default 30
    /// - `AUTHGATE_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is empty or not an http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::with_overrides(None, None)
    }

    /// Like `from_env`, but explicit values win and their env vars are never
    /// read. Only the merged API URL is validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting API URL is empty or not an http(s) URL.
    pub fn with_overrides(api_url: Option<&str>, storage_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let api_url = api_url.map_or_else(
            || std::env::var("AUTHGATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned()),
            str::to_owned,
        );
        let storage_path = storage_path.unwrap_or_else(|| {
            std::env::var("AUTHGATE_STORAGE_PATH").map_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH), PathBuf::from)
        });
        Self::new(&api_url, storage_path, HttpTimeouts::from_env())
    }

    /// Build config from explicit values, normalizing the API URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is empty or not an http(s) URL.
    pub fn new(api_url: &str, storage_path: PathBuf, timeouts: HttpTimeouts) -> Result<Self, ConfigError> {
        let api_url = normalize_api_url(api_url)?;
        Ok(Self { api_url, storage_path, timeouts })
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyApiUrl);
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ConfigError::InvalidApiUrl(trimmed.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
