//! Console configuration with TOML file support.

use serde::{Deserialize, Serialize};
use specter_types::MotionParams;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(String),

    #[error("failed to parse config file: {0}")]
    Parse(String),
}

/// Configuration for the console host.
///
/// Can be loaded from a TOML file via [`AppConfig::from_toml_file`] or built
/// programmatically; CLI flags and env vars override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Base URL of the backend API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Path of the JSON session store.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Motion parameters for sequences and the canvas loop.
    #[serde(default)]
    pub motion: MotionParams,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./specter_session.json")
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            storage_path: default_storage_path(),
            motion: MotionParams::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = AppConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.log_level, "info");
        assert!(!config.motion.reduced_motion);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            api_url = "https://api.specter.test"

            [motion]
            reduced_motion = true
            settle_ms = 300
        "#;
        let config = AppConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.api_url, "https://api.specter.test");
        assert!(config.motion.reduced_motion);
        assert_eq!(config.motion.settle_ms, 300);
        // Untouched motion fields keep their defaults.
        assert_eq!(config.motion.notify_ms, 1300);
    }

    #[test]
    fn garbage_toml_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_toml_str("api_url = ["),
            Err(ConfigError::Parse(_))
        ));
    }
}
