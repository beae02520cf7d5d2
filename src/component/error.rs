//! Component Error Handling
//!
//! Error types for discovery, lifecycle transitions and service publication.

use crate::component::types::{ModuleId, State};
use crate::core::error_handling::ContextualError;
use crate::core::panic::BoxError;
use thiserror::Error;

/// Result type alias for component operations
pub type ComponentResult<T> = std::result::Result<T, ComponentError>;

/// Errors raised while discovering and driving components
#[derive(Error, Debug)]
pub enum ComponentError {
    /// `do_initialize` failed; fatal to that component only
    #[error("Component '{component}' failed to initialize")]
    Configuration {
        component: String,
        #[source]
        source: BoxError,
    },

    /// `do_start` failed; fatal to that component only
    #[error("Component '{component}' failed to start")]
    Runtime {
        component: String,
        #[source]
        source: BoxError,
    },

    /// Operation invoked in a state that does not allow it
    #[error("Component '{component}' cannot {operation} while {state}")]
    IllegalState {
        component: String,
        operation: &'static str,
        state: State,
    },

    /// Declared type identifier is unknown to the module's type scope
    #[error("Cannot resolve component type '{type_id}' declared by module {module}")]
    Resolution {
        module: ModuleId,
        type_id: String,
        #[source]
        source: BoxError,
    },

    /// The factory of a resolved type failed or panicked
    #[error("Failed to instantiate component type '{type_id}' declared by module {module}")]
    Instantiation {
        module: ModuleId,
        type_id: String,
        #[source]
        source: BoxError,
    },

    /// A stop action failed; logged and swallowed by `stop()`
    #[error("Stop action of component '{component}' failed")]
    StopAction {
        component: String,
        #[source]
        source: BoxError,
    },

    /// The service registry refused a registration
    #[error("Failed to publish component '{component}' under {contracts:?}: {reason}")]
    Publication {
        component: String,
        contracts: Vec<String>,
        reason: String,
    },

    /// `stop()` or `destroy()` panicked during a batch stop
    #[error("Component '{component}' failed during {operation}")]
    Teardown {
        component: String,
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// A type identifier was registered twice in the same registry
    #[error("Component type '{type_id}' is already registered")]
    DuplicateType { type_id: String },

    /// A lock was poisoned by a panicking thread
    #[error("{message}")]
    Synchronization { message: String },
}

impl ComponentError {
    /// The component name this error is about, when it concerns one
    pub fn component(&self) -> Option<&str> {
        match self {
            ComponentError::Configuration { component, .. }
            | ComponentError::Runtime { component, .. }
            | ComponentError::IllegalState { component, .. }
            | ComponentError::StopAction { component, .. }
            | ComponentError::Publication { component, .. }
            | ComponentError::Teardown { component, .. } => Some(component),
            _ => None,
        }
    }

    /// The declared type identifier, for discovery-time errors
    pub fn type_id(&self) -> Option<&str> {
        match self {
            ComponentError::Resolution { type_id, .. }
            | ComponentError::Instantiation { type_id, .. }
            | ComponentError::DuplicateType { type_id } => Some(type_id),
            _ => None,
        }
    }

    /// True for errors raised while discovering types, before any lifecycle call
    pub fn is_discovery_error(&self) -> bool {
        matches!(
            self,
            ComponentError::Resolution { .. } | ComponentError::Instantiation { .. }
        )
    }
}

impl ContextualError for ComponentError {
    fn is_user_actionable(&self) -> bool {
        false // Component failures are reported under the failing operation
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}
