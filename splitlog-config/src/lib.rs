//! # Splitlog Configuration
//!
//! The logging configuration consumed when a routing logger is constructed.
//!
//! ## Features
//! - **Defaults**: `{format: "json", level: "info"}` when nothing is configured
//! - **Layering**: YAML file, then `SPLITLOG_*` environment variables
//! - **Fail-open**: level strings are never validated here; unknown values are
//!   resolved to "allow all" by the logger itself

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Json, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};

mod error;

pub use error::ConfigError;

/// The default logging output format.
pub const DEFAULT_FORMAT: &str = "json";
/// The default logging severity level.
pub const DEFAULT_LEVEL: &str = "info";

/// Base configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/logging.yaml";
/// Prefix of the environment variables overriding file values.
pub const ENV_PREFIX: &str = "SPLITLOG_";

/// Service logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Output format. Only `json` is meaningful; any other value falls back to it.
    pub format: String,

    /// Minimum severity allowed on the standard stream: `none`, `error`, `warn`,
    /// `info` or `debug`. Anything else lets every entry through.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_FORMAT.to_string(),
            level: DEFAULT_LEVEL.to_string(),
        }
    }
}

impl LogConfig {
    /// Creates a configuration with the given level and the default format.
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Self::default()
        }
    }

    /// Load configuration from the default file and environment.
    ///
    /// Hierarchy:
    /// 1. Default Values
    /// 2. `config/logging.yaml` - if missing, defaults are used.
    /// 3. `SPLITLOG_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(LogConfig::default()));

        if Path::new(DEFAULT_CONFIG_PATH).exists() {
            figment = figment.merge(Yaml::file(DEFAULT_CONFIG_PATH));
        }

        figment
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Load configuration from a specific YAML file, then apply the environment overlay.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Figment::from(Serialized::defaults(LogConfig::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
            .map_err(ConfigError::from)
    }

    /// Parse a `{"format": ..., "level": ...}` document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(LogConfig::default()))
            .merge(Json::string(json))
            .extract()
            .map_err(ConfigError::from)
    }
}
