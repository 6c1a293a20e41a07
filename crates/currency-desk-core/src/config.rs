// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Configuration
//
// Remote API settings come from the environment; the options document lives
// in the platform config directory unless a directory is given explicitly.

use crate::types::AppError;
use std::fs;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.currencyscoop.com";
pub const API_KEY_ENV: &str = "CURRENCY_SCOOP_API_KEY";
pub const BASE_URL_ENV: &str = "CURRENCY_SCOOP_BASE_URL";

/// Settings for the remote currency-rates API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme and host, without a trailing slash
    pub base_url: String,
    /// Sent as the `api_key` query parameter on every request
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl ClientConfig {
    /// Read the API key and an optional base URL override from the environment
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!("{} is not set, requests will be unauthenticated", API_KEY_ENV);
        }

        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self::new(base_url, api_key)
    }

    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Build the URL for an API path such as `convert`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.base_url, path)
    }
}

/// Where the options document is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub dir: PathBuf,
}

impl StorageConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the platform config directory, creating it if needed
    pub fn default_dir() -> Result<Self, AppError> {
        let config_dir = directories::ProjectDirs::from("com", "currencydesk", "desk")
            .ok_or_else(|| {
                AppError::InvalidConfig("Could not determine config directory".to_string())
            })?
            .config_dir()
            .to_path_buf();

        fs::create_dir_all(&config_dir)
            .map_err(|e| AppError::Persistence(format!("Failed to create config dir: {}", e)))?;

        Ok(Self::new(config_dir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_client_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.currencyscoop.com");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_endpoint_strips_trailing_slash() {
        let config = ClientConfig::new("http://localhost:8080/", None);
        assert_eq!(config.endpoint("latest"), "http://localhost:8080/v1/latest");
    }
}
