//! Tracker configuration
//!
//! The tracker reads no process-wide state. The process type, the name of
//! the declared-components header and per-type component settings all come
//! from a [`TrackerConfig`].

use crate::component::api::ComponentConfig;
use crate::core::error_handling::ContextualError;
use crate::module::types::DEFAULT_COMPONENTS_HEADER;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read configuration file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    Invalid { message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. } | ConfigError::Invalid { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Invalid { message } => Some(message),
            ConfigError::NotFound { .. } => Some("The specified configuration file does not exist"),
            _ => None,
        }
    }
}

/// Settings of a [`ModuleTracker`](crate::module::api::ModuleTracker)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackerConfig {
    /// Kind of the running process, compared case-sensitively with each
    /// type's applicability filter
    pub process_type: String,

    /// Header that lists a module's component types
    #[serde(default = "default_components_header")]
    pub components_header: String,

    /// Settings passed to `do_initialize`, keyed by component type id
    #[serde(default)]
    pub components: HashMap<String, ComponentConfig>,
}

fn default_components_header() -> String {
    DEFAULT_COMPONENTS_HEADER.to_string()
}

impl TrackerConfig {
    pub fn new(process_type: impl Into<String>) -> Self {
        Self {
            process_type: process_type.into(),
            components_header: default_components_header(),
            components: HashMap::new(),
        }
    }

    pub fn with_components_header(mut self, header: impl Into<String>) -> Self {
        self.components_header = header.into();
        self
    }

    pub fn with_component_settings(mut self, type_id: impl Into<String>, config: ComponentConfig) -> Self {
        self.components.insert(type_id.into(), config);
        self
    }

    /// Settings for `type_id`, empty when none were configured
    pub fn settings_for(&self, type_id: &str) -> ComponentConfig {
        self.components.get(type_id).cloned().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.process_type.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "process_type must not be empty".to_string(),
            });
        }
        if self.components_header.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "components_header must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Read a TOML file into `T`
pub fn load_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
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
