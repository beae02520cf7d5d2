//! Public API for module tracking
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Host-facing module model
pub use crate::module::types::{
    Module, ModuleEvent, ModuleListener, StaticModule, DEFAULT_COMPONENTS_HEADER,
};

// Tracking
pub use crate::module::managed::ManagedModule;
pub use crate::module::tracker::{ModuleHandle, ModuleTracker};

// Configuration
pub use crate::module::config::{load_toml, ConfigError, TrackerConfig};
