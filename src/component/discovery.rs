//! Component Discovery
//!
//! Turns the type identifiers a module declares into lifecycle managers.
//! Each declared type is handled on its own: a type that cannot be resolved
//! or instantiated is reported and skipped, and the remaining types are still
//! discovered.

use crate::component::diagnostics::{Diagnostic, DiagnosticSink, LogSink, MessageCode};
use crate::component::error::{ComponentError, ComponentResult};
use crate::component::lifecycle::LifecycleManager;
use crate::component::services::ServiceRegistry;
use crate::core::panic::contain_fallible;
use crate::module::types::Module;
use std::sync::Arc;

/// Split a declared-components header into type identifiers
///
/// Identifiers are separated by commas and/or whitespace; empty entries are
/// dropped and the declared order is kept.
pub fn parse_component_list(header: &str) -> Vec<String> {
    header
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Everything discovery produced for one module
#[derive(Debug, Default)]
pub struct DiscoveryOutcome {
    /// Managers in declaration order, none of them initialized yet
    pub managers: Vec<LifecycleManager>,
    /// One entry per type that failed to resolve or instantiate
    pub errors: Vec<ComponentError>,
    /// Types skipped because they do not apply to this process type
    pub skipped: Vec<String>,
}

/// Resolves, filters and instantiates declared component types
pub struct ComponentDiscoverer {
    process_type: String,
    diagnostics: Arc<dyn DiagnosticSink>,
    services: Option<Arc<dyn ServiceRegistry>>,
}

impl std::fmt::Debug for ComponentDiscoverer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDiscoverer")
            .field("process_type", &self.process_type)
            .field("publishes_services", &self.services.is_some())
            .finish()
    }
}

impl ComponentDiscoverer {
    pub fn new(process_type: impl Into<String>) -> Self {
        Self {
            process_type: process_type.into(),
            diagnostics: Arc::new(LogSink),
            services: None,
        }
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Managers created from now on publish their services to `registry`
    pub fn with_service_registry(mut self, registry: Arc<dyn ServiceRegistry>) -> Self {
        self.services = Some(registry);
        self
    }

    pub fn process_type(&self) -> &str {
        &self.process_type
    }

    /// Discover a single declared type.
    ///
    /// Returns `Ok(None)` when the type does not apply to the current process
    /// type. No lifecycle method of the new component is called.
    pub fn discover(
        &self,
        module: &dyn Module,
        type_id: &str,
    ) -> ComponentResult<Option<LifecycleManager>> {
        let component_type =
            module
                .type_scope()
                .resolve(type_id)
                .map_err(|e| ComponentError::Resolution {
                    module: module.id(),
                    type_id: type_id.to_string(),
                    source: Box::new(e),
                })?;

        if !component_type.applies_to(&self.process_type) {
            self.diagnostics.report(
                Diagnostic::new(
                    MessageCode::ProcessTypeMismatch,
                    format!(
                        "Skipping component type '{}' of module '{}': only valid for process types {:?}, current is '{}'",
                        type_id,
                        module.symbolic_name(),
                        component_type.process_types.unwrap_or_default(),
                        self.process_type
                    ),
                )
                .with_module(module.id())
                .with_type_id(type_id),
            );
            return Ok(None);
        }

        let component = contain_fallible(component_type.factory).map_err(|source| {
            ComponentError::Instantiation {
                module: module.id(),
                type_id: type_id.to_string(),
                source,
            }
        })?;

        let mut manager = LifecycleManager::new(
            type_id,
            module.id(),
            component,
            component_type.service_contracts(),
        )
        .with_diagnostics(Arc::clone(&self.diagnostics));
        if let Some(registry) = &self.services {
            manager = manager.with_service_registry(Arc::clone(registry));
        }
        log::debug!(
            "Adding component {} ({}) to module '{}'",
            manager.name(),
            type_id,
            module.symbolic_name()
        );
        Ok(Some(manager))
    }

    /// Discover every declared type, reporting failures to the diagnostic channel
    pub fn discover_all(&self, module: &dyn Module, type_ids: &[String]) -> DiscoveryOutcome {
        let mut outcome = DiscoveryOutcome::default();
        for type_id in type_ids {
            match self.discover(module, type_id) {
                Ok(Some(manager)) => outcome.managers.push(manager),
                Ok(None) => outcome.skipped.push(type_id.clone()),
                Err(error) => {
                    self.diagnostics
                        .report(Diagnostic::from_error(Some(module.id()), &error));
                    outcome.errors.push(error);
                }
            }
        }
        outcome
    }
}
