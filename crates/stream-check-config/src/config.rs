use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use stream_check_models::canonical_service_id;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found at {0}")]
    NotFound(PathBuf),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config: {0}")]
    Malformed(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Watchlist username on the catalog site.
    #[serde(default)]
    pub username: String,
    /// Streaming services to check, as displayed names ("Netflix",
    /// "Amazon Prime Video"); matched against offers after canonicalization.
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default = "default_country")]
    pub country: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub run: RunLimits,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunLimits {
    /// Hard stop for pagination, guards against a source that never returns
    /// an empty page.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Maximum in-flight availability queries.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Delay before the single retry of a transport-failed query.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Overall run deadline in seconds; 0 disables it.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_country() -> String {
    "US".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_max_pages() -> u32 {
    20
}

fn default_concurrency() -> usize {
    6
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_deadline_secs() -> u64 {
    120
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            concurrency: default_concurrency(),
            retry_delay_ms: default_retry_delay_ms(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: String::new(),
            services: Vec::new(),
            country: default_country(),
            language: default_language(),
            run: RunLimits::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(format!("serialization failed: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Checked before any network activity.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::Invalid("username is required".to_string()));
        }
        if self.services.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "at least one streaming service must be selected".to_string(),
            ));
        }
        if self.run.concurrency == 0 {
            return Err(ConfigError::Invalid(
                "run.concurrency must be at least 1".to_string(),
            ));
        }
        if self.run.max_pages == 0 {
            return Err(ConfigError::Invalid(
                "run.max_pages must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Canonical service identifiers for offer filtering.
    pub fn selected_services(&self) -> HashSet<String> {
        self.services
            .iter()
            .filter(|s| !s.trim().is_empty())
            .map(|s| canonical_service_id(s))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn valid_config() -> Config {
        Config {
            username: "mrbeeef".to_string(),
            services: vec!["Netflix".to_string(), "Amazon Prime Video".to_string()],
            ..Config::default()
        }
    }

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let config = valid_config();
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_minimal_toml_gets_defaults() {
        let config: Config =
            toml::from_str("username = \"sophie\"\nservices = [\"Max\"]").unwrap();
        assert_eq!(config.country, "US");
        assert_eq!(config.language, "en");
        assert_eq!(config.run.max_pages, 20);
        assert_eq!(config.run.concurrency, 6);
    }

    #[test]
    fn test_validate_rejects_empty_username() {
        let config = Config {
            username: "  ".to_string(),
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_service_selection() {
        let config = Config {
            services: vec![],
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_selected_services_are_canonical() {
        let services = valid_config().selected_services();
        assert!(services.contains("netflix"));
        assert!(services.contains("amazon prime video"));
    }
}
