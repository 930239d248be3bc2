//! Application configuration management.
//!
//! Holds the backend base URL, the request timeout and the last username
//! used to sign in. Stored at `~/.config/tourni/config.json`; the session
//! itself lives in the data directory next to it.
//!
//! `TOURNI_BASE_URL`, `TOURNI_USERNAME` and `TOURNI_PASSWORD` override the
//! file (and prompts) when set.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};

/// Application name used for config/data directory paths
const APP_NAME: &str = "tourni";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_BASE_URL: &str = "TOURNI_BASE_URL";
pub const ENV_USERNAME: &str = "TOURNI_USERNAME";
pub const ENV_PASSWORD: &str = "TOURNI_PASSWORD";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub last_username: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the persisted session.
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = Some(url);
        }
    }

    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(
            self.request_timeout_secs
                .filter(|&secs| secs > 0)
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        )
    }

    /// Username from `TOURNI_USERNAME`, falling back to the last one used.
    pub fn default_username(&self) -> Option<String> {
        std::env::var(ENV_USERNAME)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.last_username.clone())
    }

    pub fn env_password() -> Option<String> {
        std::env::var(ENV_PASSWORD).ok().filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.resolved_base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn test_zero_timeout_uses_default() {
        let config = Config {
            request_timeout_secs: Some(0),
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS));
    }

    #[test]
    fn test_env_override_wins() {
        let mut config = Config {
            base_url: Some("http://file:8080".into()),
            ..Default::default()
        };
        config.apply_overrides(|key| {
            (key == ENV_BASE_URL).then(|| "https://tourni.example".to_string())
        });
        assert_eq!(config.resolved_base_url(), "https://tourni.example");
    }

    #[test]
    fn test_blank_override_ignored() {
        let mut config = Config {
            base_url: Some("http://file:8080".into()),
            ..Default::default()
        };
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.resolved_base_url(), "http://file:8080");
    }

    #[test]
    fn test_parses_partial_file() {
        let config: Config = serde_json::from_str(r#"{"last_username":"bob"}"#).unwrap();
        assert_eq!(config.last_username.as_deref(), Some("bob"));
        assert!(config.base_url.is_none());
    }
}
