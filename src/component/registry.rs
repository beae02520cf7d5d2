//! Type Registry
//!
//! Maps declared type identifiers to a zero-argument factory and the static
//! metadata of the type (process-type filter, service contracts).
//!
//! Types are registered ahead of time. Built-in types register themselves at
//! link time with the [`component_type!`](crate::component_type) macro and are
//! collected by [`TypeRegistry::from_inventory`]; hosts can also assemble a
//! registry per module scope with [`TypeRegistry::register`].

use crate::component::error::{ComponentError, ComponentResult};
use crate::component::traits::Component;
use crate::core::panic::BoxError;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Zero-argument constructor of a component type
pub type ComponentFactory = fn() -> Result<Arc<dyn Component>, BoxError>;

/// Static description of a component type
#[derive(Debug, Clone, Copy)]
pub struct ComponentType {
    pub type_id: &'static str,
    pub factory: ComponentFactory,
    /// Process types the component may run in; `None` means everywhere
    pub process_types: Option<&'static [&'static str]>,
    /// Contracts the started component is published under
    pub services: &'static [&'static str],
}

fn default_factory<T: Component + Default>() -> Result<Arc<dyn Component>, BoxError> {
    Ok(Arc::new(T::default()))
}

impl ComponentType {
    /// Type built with `T::default()`
    pub const fn of<T: Component + Default>(type_id: &'static str) -> Self {
        Self::with_factory(type_id, default_factory::<T>)
    }

    /// Type built with a custom factory
    pub const fn with_factory(type_id: &'static str, factory: ComponentFactory) -> Self {
        Self {
            type_id,
            factory,
            process_types: None,
            services: &[],
        }
    }

    pub const fn process_types(mut self, process_types: &'static [&'static str]) -> Self {
        self.process_types = Some(process_types);
        self
    }

    pub const fn services(mut self, services: &'static [&'static str]) -> Self {
        self.services = services;
        self
    }

    /// True when the type may be loaded in a process of type `process_type`
    ///
    /// The comparison is case-sensitive.
    pub fn applies_to(&self, process_type: &str) -> bool {
        match self.process_types {
            None => true,
            Some(allowed) => allowed.iter().any(|candidate| *candidate == process_type),
        }
    }

    /// Declared service contracts, owned
    pub fn service_contracts(&self) -> Vec<String> {
        self.services.iter().map(|s| s.to_string()).collect()
    }
}

/// Link-time registration record collected by `inventory`
pub struct ComponentTypeEntry(pub ComponentType);

inventory::collect!(ComponentTypeEntry);

/// Register a component type at link time
///
/// ```rust,ignore
/// modlife::component_type!(EchoComponent => "demo.echo",
///     process_types = ["ManagedProcess", "UnManagedProcess"],
///     services = ["demo.Echo"]);
/// ```
#[macro_export]
macro_rules! component_type {
    ($component:ty => $type_id:expr
        $(, process_types = [$($process_type:expr),* $(,)?])?
        $(, services = [$($service:expr),* $(,)?])?
        $(,)?) => {
        $crate::inventory::submit! {
            $crate::component::api::ComponentTypeEntry(
                $crate::component::api::ComponentType::of::<$component>($type_id)
                    $(.process_types(&[$($process_type),*]))?
                    $(.services(&[$($service),*]))?
            )
        }
    };
}

/// A declared type identifier is not known to the registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("type '{type_id}' is not registered ({known} known types)")]
pub struct TypeNotFound {
    pub type_id: String,
    pub known: usize,
}

/// Lookup table from type identifier to [`ComponentType`]
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<&'static str, ComponentType>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every type submitted with `component_type!`
    ///
    /// When the same identifier is submitted twice the first one wins and the
    /// duplicate is logged.
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for entry in inventory::iter::<ComponentTypeEntry>() {
            if let Err(e) = registry.register(entry.0) {
                log::warn!("Ignoring link-time registration: {}", e);
            }
        }
        log::debug!("Collected {} link-time component types", registry.len());
        registry
    }

    /// Add a type; identifiers must be unique
    pub fn register(&mut self, component_type: ComponentType) -> ComponentResult<()> {
        if self.types.contains_key(component_type.type_id) {
            return Err(ComponentError::DuplicateType {
                type_id: component_type.type_id.to_string(),
            });
        }
        self.types.insert(component_type.type_id, component_type);
        Ok(())
    }

    /// Builder-style [`register`](Self::register); a duplicate is logged and dropped
    pub fn with(mut self, component_type: ComponentType) -> Self {
        if let Err(e) = self.register(component_type) {
            log::warn!("{}", e);
        }
        self
    }

    pub fn resolve(&self, type_id: &str) -> Result<ComponentType, TypeNotFound> {
        self.types.get(type_id).copied().ok_or_else(|| TypeNotFound {
            type_id: type_id.to_string(),
            known: self.types.len(),
        })
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.types.contains_key(type_id)
    }

    /// Registered identifiers, sorted
    pub fn type_ids(&self) -> Vec<&'static str> {
        self.types.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
