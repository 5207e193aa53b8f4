use std::fs;

use serde::Deserialize;

use crate::error::{AggregatorError, Result};

fn default_page_size() -> usize {
    20
}

fn default_fetch_timeout_seconds() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Independent timeout per source fetch so one stalled source cannot
    /// block the aggregate result.
    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,
    /// Directory of source descriptor JSON files. When unset, the builtin
    /// registry is used.
    #[serde(default)]
    pub registry_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            fetch_timeout_seconds: default_fetch_timeout_seconds(),
            registry_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config_content = fs::read_to_string(config_path).map_err(|e| {
            AggregatorError::Config(format!(
                "Failed to read config file '{}': {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }

    /// Loaded config when `config.toml` exists, defaults otherwise.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_to_missing_fields() {
        let config: Config = toml::from_str("page_size = 10").unwrap();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.fetch_timeout_seconds, 10);
        assert!(config.registry_dir.is_none());
    }

    #[test]
    fn empty_file_yields_full_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.page_size, 20);
    }
}
