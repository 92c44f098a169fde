//! Config: which resources to start, where, and with what settings.
//!
//! ```json
//! {
//!   "log_level": "info",
//!   "resources": [
//!     { "kind": "logging",  "path": "/logging", "level": "debug" },
//!     { "kind": "template", "path": "/template", "temperature": 21 },
//!     { "kind": "template", "path": "/spare", "enable": false }
//!   ]
//! }
//! ```
//!
//! Resources start in the order listed. Every key besides `kind`, `path`
//! and `enable` is handed to the resource as its settings.

use crate::framework::path::ResourcePath;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid resource path {path:?} for {kind}")]
    InvalidPath { kind: String, path: String },
    #[error("Parameter {field} from {kind} must be one of {allowed:?}")]
    NotAllowed {
        kind: String,
        field: String,
        allowed: Vec<String>,
    },
    #[error("Parameter {field} from {kind} has the wrong type: {source}")]
    InvalidSetting {
        kind: String,
        field: String,
        source: serde_json::Error,
    },
    #[error("No factory for resource kind {0}")]
    UnknownResource(String),
    #[error("Failed to start resource: {0}")]
    Service(#[from] crate::framework::ServiceError),
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_enable() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            resources: vec![
                ResourceConfig::new("logging", "/logging"),
                ResourceConfig::new("template", "/template"),
            ],
        }
    }
}

impl SystemConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks the log level and every resource path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ConfigError::NotAllowed {
                kind: "system".into(),
                field: "log_level".into(),
                allowed: LOG_LEVELS.iter().map(|s| s.to_string()).collect(),
            });
        }
        for resource in &self.resources {
            resource.resource_path()?;
        }
        Ok(())
    }

    /// Resources with `enable` set, in start order.
    pub fn enabled(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.iter().filter(|r| r.enable)
    }
}

/// Construction input for one resource: where it lives and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    pub kind: String,
    pub path: String,
    #[serde(default = "default_enable")]
    pub enable: bool,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl ResourceConfig {
    pub fn new(kind: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            path: path.into(),
            enable: true,
            settings: Map::new(),
        }
    }

    /// Adds one setting.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    pub fn resource_path(&self) -> Result<ResourcePath, ConfigError> {
        ResourcePath::parse(&self.path).map_err(|_| ConfigError::InvalidPath {
            kind: self.kind.clone(),
            path: self.path.clone(),
        })
    }

    /// A typed setting, `None` when absent.
    pub fn setting<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, ConfigError> {
        self.settings
            .get(field)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|source| ConfigError::InvalidSetting {
                    kind: self.kind.clone(),
                    field: field.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// A typed setting, or `default` when absent.
    pub fn setting_or<T: DeserializeOwned>(&self, field: &str, default: T) -> Result<T, ConfigError> {
        Ok(self.setting(field)?.unwrap_or(default))
    }

    /// A string setting restricted to `allowed` (compared lower-case).
    pub fn choice(&self, field: &str, allowed: &[&str], default: &str) -> Result<String, ConfigError> {
        let value = self.setting_or(field, default.to_string())?.to_lowercase();
        if allowed.contains(&value.as_str()) {
            Ok(value)
        } else {
            Err(ConfigError::NotAllowed {
                kind: self.kind.clone(),
                field: field.to_string(),
                allowed: allowed.iter().map(|s| s.to_string()).collect(),
            })
        }
    }
}
