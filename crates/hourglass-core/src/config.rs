//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the API base address, the token storage backend, and the
//! last email used to log in.
//!
//! Configuration is stored at `~/.config/hourglass/config.json`. The
//! `HOURGLASS_API_URL` environment variable overrides the stored address.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "hourglass";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable selecting the API base address
pub const API_URL_ENV: &str = "HOURGLASS_API_URL";

/// Address used when neither the environment nor the config file set one
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Where the bearer token is persisted between runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStorageKind {
    /// JSON file in the cache directory
    #[default]
    File,
    /// OS keychain
    Keyring,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub last_email: Option<String>,
    #[serde(default)]
    pub token_storage: TokenStorageKind,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    /// Resolve the API base address: environment first, then config, then default.
    pub fn api_base_url(&self) -> String {
        Self::resolve_api_url(std::env::var(API_URL_ENV).ok(), self.api_base_url.as_deref())
    }

    fn resolve_api_url(env: Option<String>, configured: Option<&str>) -> String {
        env.filter(|v| !v.trim().is_empty())
            .or_else(|| configured.map(str::to_string))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_api_url_prefers_env() {
        let url = Config::resolve_api_url(
            Some("https://api.example.edu/".to_string()),
            Some("http://configured:9000"),
        );
        assert_eq!(url, "https://api.example.edu");
    }

    #[test]
    fn test_resolve_api_url_falls_back() {
        assert_eq!(
            Config::resolve_api_url(None, Some("http://configured:9000")),
            "http://configured:9000"
        );
        assert_eq!(Config::resolve_api_url(Some("  ".to_string()), None), DEFAULT_API_URL);
        assert_eq!(Config::resolve_api_url(None, None), DEFAULT_API_URL);
    }

    #[test]
    fn test_config_parses_partial_json() {
        let config: Config = serde_json::from_str(r#"{"token_storage": "keyring"}"#)
            .expect("config should parse");
        assert_eq!(config.token_storage, TokenStorageKind::Keyring);
        assert!(config.api_base_url.is_none());
        assert!(config.last_email.is_none());
    }
}
