use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::ai::DEFAULT_ENDPOINT;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const ENDPOINT_ENV: &str = "GEMINI_CHAT_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub dark_mode: Option<bool>,
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::get_config_path()?)?;
        Ok(config.merge_env(|name| std::env::var(name).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    /// Persist a newly entered API key without touching other settings
    pub fn save_api_key(key: &str) -> Result<()> {
        let path = Self::get_config_path()?;
        let mut config = Self::load_from(&path).unwrap_or_else(|_| Self::new());
        config.api_key = Some(key.to_string());
        config.save_to(&path)
    }

    /// Non-empty values from the environment win over the file
    pub fn merge_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.endpoint = Some(endpoint);
        }
        self
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("gemini-chat").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.endpoint(), DEFAULT_ENDPOINT);
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            api_key: Some("abc".to_string()),
            dark_mode: Some(true),
            ..Config::default()
        };

        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_leaves_other_fields_unset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"endpoint":"http://localhost:8080/generate"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint(), "http://localhost:8080/generate");
        assert_eq!(config.api_key, None);
        assert_eq!(config.request_timeout_secs, None);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (API_KEY_ENV, "from-env"),
            (ENDPOINT_ENV, "http://example.test/generate"),
        ]);
        let config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        }
        .merge_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.endpoint(), "http://example.test/generate");
    }

    #[test]
    fn test_blank_env_does_not_clear_file_key() {
        let config = Config {
            api_key: Some("from-file".to_string()),
            ..Config::default()
        }
        .merge_env(|_| Some("  ".to_string()));

        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }
}
