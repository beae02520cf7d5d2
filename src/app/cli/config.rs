//! Host configuration file
//!
//! Describes the tracker settings and the modules the host simulator loads:
//!
//! ```toml
//! [tracker]
//! process_type = "ManagedProcess"
//!
//! [tracker.components."demo.echo"]
//! greeting = "hello"
//!
//! [[module]]
//! id = 1
//! name = "demo.core"
//! components = "demo.heartbeat, demo.echo"
//! ```

use crate::component::api::{ComponentConfig, ModuleId, TypeRegistry};
use crate::module::api::{load_toml, ConfigError, StaticModule, TrackerConfig};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One module the host loads
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub id: u64,
    pub name: String,
    /// Declared component types; absent means the module declares none
    #[serde(default)]
    pub components: Option<String>,
    /// Additional metadata headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ModuleConfig {
    /// Build the module, placing `components` under `components_header`
    pub fn to_module(&self, scope: Arc<TypeRegistry>, components_header: &str) -> StaticModule {
        let mut module = StaticModule::new(ModuleId(self.id), self.name.clone(), scope);
        for (name, value) in &self.headers {
            module.set_header(name.clone(), value.clone());
        }
        if let Some(components) = &self.components {
            module.set_header(components_header, components.clone());
        }
        module
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    pub tracker: TrackerConfig,
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleConfig>,
}

/// `<config dir>/modlife/modlife.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("modlife").join("modlife.toml"))
}

impl HostConfig {
    /// Load and validate a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = load_toml(path)?;
        config.validate()?;
        log::debug!("Loaded host configuration from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given (it must exist), else the default file if it
    /// exists, else the built-in demo configuration
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => {
                log::debug!("No configuration file found; using built-in demo modules");
                Ok(Self::builtin())
            }
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        let mut seen = HashSet::new();
        for module in &self.modules {
            if module.name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    message: format!("module {} has an empty name", module.id),
                });
            }
            if !seen.insert(module.id) {
                return Err(ConfigError::Invalid {
                    message: format!("module id {} is used more than once", module.id),
                });
            }
        }
        Ok(())
    }

    /// Demo modules exercising every outcome: a healthy module, one with a
    /// failing and an unknown component, and one that declares nothing
    pub fn builtin() -> Self {
        let mut echo = toml::Table::new();
        echo.insert(
            "greeting".to_string(),
            toml::Value::String("hello from modlife".to_string()),
        );
        let tracker = TrackerConfig::new("ManagedProcess")
            .with_component_settings("demo.echo", ComponentConfig::new(echo));

        let module = |id: u64, name: &str, components: Option<&str>| ModuleConfig {
            id,
            name: name.to_string(),
            components: components.map(str::to_string),
            headers: BTreeMap::new(),
        };
        Self {
            tracker,
            modules: vec![
                module(1, "demo.core", Some("demo.heartbeat, demo.echo")),
                module(2, "demo.broken", Some("demo.faulty_start demo.missing demo.echo")),
                module(3, "demo.library", None),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error_handling::ContextualError;
    use crate::module::api::Module;

    #[test]
    fn test_parse_host_config() {
        let config = HostConfig::from_toml_str(
            r#"
            [tracker]
            process_type = "NodeAgent"

            [[module]]
            id = 10
            name = "acme.web"
            components = "acme.Http acme.Metrics"
            headers = { "Bundle-Version" = "2.0.1" }

            [[module]]
            id = 11
            name = "acme.util"
            "#,
        )
        .unwrap();

        assert_eq!(config.tracker.process_type, "NodeAgent");
        assert_eq!(config.modules.len(), 2);
        assert_eq!(config.modules[0].components.as_deref(), Some("acme.Http acme.Metrics"));
        assert_eq!(config.modules[1].components, None);

        let module = config.modules[0].to_module(Arc::new(TypeRegistry::new()), "Managed-Components");
        assert_eq!(module.id(), ModuleId(10));
        assert_eq!(module.header("Managed-Components"), Some("acme.Http acme.Metrics"));
        assert_eq!(module.header("Bundle-Version"), Some("2.0.1"));
    }

    #[test]
    fn test_duplicate_module_ids_rejected() {
        let error = HostConfig::from_toml_str(
            r#"
            [tracker]
            process_type = "ManagedProcess"

            [[module]]
            id = 1
            name = "a"

            [[module]]
            id = 1
            name = "b"
            "#,
        )
        .unwrap_err();
        assert_eq!(error.user_message(), Some("module id 1 is used more than once"));
    }

    #[test]
    fn test_missing_tracker_section_is_parse_error() {
        let error = HostConfig::from_toml_str("[[module]]\nid = 1\nname = \"a\"\n").unwrap_err();
        assert!(matches!(error, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_builtin_is_valid() {
        let config = HostConfig::builtin();
        assert!(config.validate().is_ok());
        assert_eq!(config.modules.len(), 3);
        assert_eq!(
            config.tracker.settings_for("demo.echo").get_str("greeting"),
            Some("hello from modlife")
        );
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let error = HostConfig::resolve(Some(Path::new("/no/such/modlife.toml"))).unwrap_err();
        assert!(matches!(error, ConfigError::NotFound { .. }));
        assert!(error.is_user_actionable());
    }
}
