//! Type definitions for the component system
//!
//! Lifecycle states, module identity and per-component configuration.

use serde::Deserialize;
use std::fmt;

/// Prefix of every component name, followed by the simple type name
pub const COMPONENT_NAME_PREFIX: &str = "LC_";

/// Lifecycle state of a managed component
///
/// States are totally ordered in the sequence they are entered. A component
/// never moves back to an earlier state; `Destroyed` is terminal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    strum_macros::Display,
    strum_macros::AsRefStr,
    strum_macros::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum State {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
    Starting,
    Started,
    Stopping,
    Stopped,
    Destroying,
    Destroyed,
}

impl State {
    /// True once teardown has begun
    pub fn is_stopping_or_later(self) -> bool {
        self >= State::Stopping
    }
}

/// Host-assigned identity of a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u64);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Settings handed to a component's `do_initialize` hook
///
/// Backed by a TOML table taken from the `[components."<type id>"]` section of
/// the tracker configuration; empty when nothing was configured.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ComponentConfig {
    values: toml::Table,
}

impl ComponentConfig {
    pub fn new(values: toml::Table) -> Self {
        Self { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&toml::Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_str())
    }

    pub fn get_integer(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(|v| v.as_integer())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.get(key).and_then(|v| v.as_bool())
    }

    /// Deserialize the whole table into a typed settings struct
    pub fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T, toml::de::Error> {
        toml::Value::Table(self.values.clone()).try_into()
    }
}

/// `my_crate::net::Listener<u8>` becomes `Listener`
pub fn simple_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
}

/// Diagnostic name of a component, derived from its concrete type
pub fn component_name(type_name: &str) -> String {
    format!("{}{}", COMPONENT_NAME_PREFIX, simple_type_name(type_name))
}
