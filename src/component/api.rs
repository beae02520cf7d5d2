//! Public API for the component system
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Components and their lifecycle
pub use crate::component::lifecycle::{LifecycleManager, StopActions};
pub use crate::component::traits::Component;
pub use crate::component::types::{
    component_name, simple_type_name, ComponentConfig, ModuleId, State, COMPONENT_NAME_PREFIX,
};

// Error handling
pub use crate::component::error::{ComponentError, ComponentResult};
pub use crate::core::panic::BoxError;

// Type registration
pub use crate::component::registry::{
    ComponentFactory, ComponentType, ComponentTypeEntry, TypeNotFound, TypeRegistry,
};

// Discovery
pub use crate::component::discovery::{parse_component_list, ComponentDiscoverer, DiscoveryOutcome};

// Service publication
pub use crate::component::services::{InMemoryServiceRegistry, RegistrationHandle, ServiceRegistry};

// Diagnostic channel
pub use crate::component::diagnostics::{
    Diagnostic, DiagnosticSink, LogSink, MessageCode, RecordingSink,
};
