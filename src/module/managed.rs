//! Managed Module
//!
//! The ordered set of lifecycle managers created for one module, and the
//! batch start/stop operations the tracker drives.

use crate::component::api::{
    ComponentError, Diagnostic, DiagnosticSink, LifecycleManager, ModuleId, State,
};
use crate::core::panic::contain;
use crate::core::sync::lock_recovering;
use crate::module::config::TrackerConfig;
use crate::module::types::Module;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Components of one tracked module, in discovery order
pub struct ManagedModule {
    module: Arc<dyn Module>,
    components: Vec<LifecycleManager>,
    errors: Mutex<Vec<Arc<ComponentError>>>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for ManagedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedModule")
            .field("module", &self.module.id())
            .field("components", &self.components.len())
            .field("errors", &lock_recovering(&self.errors, "module errors").len())
            .finish()
    }
}

impl ManagedModule {
    /// Wrap discovered managers; `discovery_errors` seed the module's error list
    pub fn new(
        module: Arc<dyn Module>,
        components: Vec<LifecycleManager>,
        discovery_errors: Vec<ComponentError>,
        diagnostics: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            module,
            components,
            errors: Mutex::new(discovery_errors.into_iter().map(Arc::new).collect()),
            diagnostics,
        }
    }

    pub fn module(&self) -> &Arc<dyn Module> {
        &self.module
    }

    pub fn id(&self) -> ModuleId {
        self.module.id()
    }

    pub fn components(&self) -> &[LifecycleManager] {
        &self.components
    }

    /// `(name, type id, state)` of every component
    pub fn states(&self) -> Vec<(String, String, State)> {
        self.components
            .iter()
            .map(|manager| {
                (
                    manager.name().to_string(),
                    manager.type_id().to_string(),
                    manager.state(),
                )
            })
            .collect()
    }

    /// Discovery, start and teardown errors recorded so far
    pub fn errors(&self) -> Vec<Arc<ComponentError>> {
        lock_recovering(&self.errors, "module errors").clone()
    }

    /// Initialize then start every component in discovery order.
    ///
    /// A component whose `initialize` fails is not started. Failures are
    /// recorded and reported; they never stop the remaining components.
    /// Returns the number of components that reached `Started`.
    pub fn start_components(&self, config: &TrackerConfig) -> usize {
        let mut started = 0;
        for manager in &self.components {
            let settings = config.settings_for(manager.type_id());
            let outcome = manager.initialize(&settings).and_then(|_| manager.start());
            match outcome {
                Ok(()) => started += 1,
                Err(error) => self.record(manager, error),
            }
        }
        log::debug!(
            "Started {}/{} components of module '{}'",
            started,
            self.components.len(),
            self.module.symbolic_name()
        );
        started
    }

    /// Stop then destroy every component, whatever state it reached.
    ///
    /// Panics from `do_destroy` are contained here; every component is
    /// attempted regardless of earlier failures.
    pub fn stop_components(&self) {
        for manager in &self.components {
            for (operation, result) in [
                ("stop", contain(|| manager.stop())),
                ("destroy", contain(|| manager.destroy())),
            ] {
                let error = match result {
                    Ok(Ok(())) => continue,
                    Ok(Err(error)) => error,
                    Err(panic) => ComponentError::Teardown {
                        component: manager.name().to_string(),
                        operation,
                        source: Box::new(panic),
                    },
                };
                self.record(manager, error);
            }
        }
        log::debug!(
            "Stopped {} components of module '{}'",
            self.components.len(),
            self.module.symbolic_name()
        );
    }

    fn record(&self, manager: &LifecycleManager, error: ComponentError) {
        self.diagnostics.report(
            Diagnostic::from_error(Some(self.module.id()), &error).with_type_id(manager.type_id()),
        );
        lock_recovering(&self.errors, "module errors").push(Arc::new(error));
    }
}
