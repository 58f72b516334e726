//! Application configuration
//!
//! Loaded once at startup from `codecraft.toml` in the platform config
//! directory. Every field has a default, so a missing file or a partial file
//! both work. A file that fails to parse is reported and ignored.
//!
//! ```toml
//! [generation]
//! model = "gemini-3-flash-preview"
//! temperature = 0.7
//!
//! [preview]
//! debounce_ms = 1000
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Environment variables checked, in order, for the API key
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

const CONFIG_FILE_NAME: &str = "codecraft.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Base URL of the Gemini REST API
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key: None,
            max_output_tokens: 8192,
            temperature: 0.7,
            request_timeout_secs: 120,
        }
    }
}

impl GenerationSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Quiet period before an edit reaches the preview
    pub debounce_ms: u64,
    pub mobile_width: u32,
    pub mobile_height: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            debounce_ms: 1000,
            mobile_width: 375,
            mobile_height: 667,
        }
    }
}

impl PreviewSettings {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationSettings,
    pub preview: PreviewSettings,
}

impl AppConfig {
    /// Default location: `<config dir>/codecraft.toml`
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "", "codecraft")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Parse a config file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the default location, apply environment overrides, and
    /// fall back to defaults on any error.
    pub fn load() -> Self {
        let mut config = match Self::default_path() {
            Some(path) => match Self::load_from(&path) {
                Ok(config) => {
                    info!("Configuration loaded from {:?}", path);
                    config
                }
                Err(e) => {
                    warn!("Ignoring configuration file: {}", e);
                    Self::default()
                }
            },
            None => {
                warn!("Could not determine configuration directory, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(|name| std::env::var(name).ok());
        config
    }

    /// Let the environment supply the API key, e.g. `GEMINI_API_KEY`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .find_map(|name| lookup(name).filter(|value| !value.trim().is_empty()));

        if let Some(key) = from_env {
            self.generation.api_key = Some(key);
        }
    }
}
