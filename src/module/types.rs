//! Module model
//!
//! A module is a unit of dynamically loaded code owned by the host. The
//! tracker only needs its identity, a name for diagnostics, its metadata
//! headers and the type scope used to resolve the components it declares.

use crate::component::api::{ModuleId, TypeRegistry};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Default name of the header listing a module's component types
pub const DEFAULT_COMPONENTS_HEADER: &str = "Managed-Components";

/// A host module as seen by the tracker
pub trait Module: Send + Sync + fmt::Debug {
    /// Identity; two modules are the same module iff their ids are equal
    fn id(&self) -> ModuleId;

    /// Human-readable name used in diagnostics
    fn symbolic_name(&self) -> &str;

    /// Value of a metadata header
    fn header(&self, name: &str) -> Option<&str>;

    /// Types visible from this module
    fn type_scope(&self) -> &TypeRegistry;
}

/// Host notification accompanying a module callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ModuleEvent {
    Installed,
    Resolved,
    Starting,
    Started,
    Updated,
    Stopping,
    Stopped,
    Unresolved,
    Uninstalled,
}

/// The observer triad the host's module-loading subsystem drives
///
/// `event` is `None` when the host reports modules that were already present
/// when tracking began.
pub trait ModuleListener: Send + Sync {
    type Handle: Send + Sync;

    /// A module appeared. Returning `None` leaves the module untracked.
    fn adding_module(&self, module: Arc<dyn Module>, event: Option<ModuleEvent>) -> Option<Self::Handle>;

    /// A tracked module changed
    fn modified_module(&self, module: &Arc<dyn Module>, event: Option<ModuleEvent>, handle: &Self::Handle);

    /// A module went away; `handle` is what `adding_module` returned
    fn removed_module(&self, module: &Arc<dyn Module>, event: Option<ModuleEvent>, handle: Option<Self::Handle>);
}

/// Plain in-memory [`Module`] built from an id, a name, headers and a type scope
#[derive(Clone)]
pub struct StaticModule {
    id: ModuleId,
    symbolic_name: String,
    headers: BTreeMap<String, String>,
    scope: Arc<TypeRegistry>,
}

impl fmt::Debug for StaticModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticModule")
            .field("id", &self.id)
            .field("symbolic_name", &self.symbolic_name)
            .field("headers", &self.headers)
            .field("scope", &self.scope.len())
            .finish()
    }
}

impl StaticModule {
    pub fn new(id: ModuleId, symbolic_name: impl Into<String>, scope: Arc<TypeRegistry>) -> Self {
        Self {
            id,
            symbolic_name: symbolic_name.into(),
            headers: BTreeMap::new(),
            scope,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Shorthand for setting [`DEFAULT_COMPONENTS_HEADER`]
    pub fn with_components(self, components: impl Into<String>) -> Self {
        self.with_header(DEFAULT_COMPONENTS_HEADER, components)
    }

    /// Replace a header value in place, as a host does when a module is updated
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name.into(), value.into());
    }
}

impl Module for StaticModule {
    fn id(&self) -> ModuleId {
        self.id
    }

    fn symbolic_name(&self) -> &str {
        &self.symbolic_name
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn type_scope(&self) -> &TypeRegistry {
        &self.scope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_module_headers() {
        let module = StaticModule::new(ModuleId(5), "acme.core", Arc::new(TypeRegistry::new()))
            .with_components("a, b")
            .with_header("Bundle-Version", "1.2.0");

        assert_eq!(module.id(), ModuleId(5));
        assert_eq!(module.symbolic_name(), "acme.core");
        assert_eq!(module.header(DEFAULT_COMPONENTS_HEADER), Some("a, b"));
        assert_eq!(module.header("Bundle-Version"), Some("1.2.0"));
        assert_eq!(module.header("Missing"), None);
        assert!(module.type_scope().is_empty());
    }

    #[test]
    fn test_module_event_display() {
        assert_eq!(ModuleEvent::Uninstalled.to_string(), "uninstalled");
    }
}
