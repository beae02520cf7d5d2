//! Module Tracker
//!
//! Entry point driven by the host's module-loading subsystem. Each module
//! that declares components gets a [`ManagedModule`] whose components are
//! started when the module is added and stopped when it is removed.
//!
//! Module events may be delivered on different threads. The tracked
//! collection is the only state shared between them; all component work for
//! one event runs on the delivering thread, outside the collection lock.

use crate::component::api::{
    parse_component_list, ComponentDiscoverer, ComponentError, Diagnostic, DiagnosticSink,
    LogSink, MessageCode, ModuleId, ServiceRegistry,
};
use crate::core::sync::{lock_recovering, read_recovering, write_lock};
use crate::module::config::TrackerConfig;
use crate::module::managed::ManagedModule;
use crate::module::types::{Module, ModuleEvent, ModuleListener};
use std::fmt;
use std::sync::{Arc, Mutex, RwLock};

/// Handle returned to the host for a tracked module
pub type ModuleHandle = Arc<ManagedModule>;

/// Holds back entries until the module they concern is known to be tracked.
///
/// Released entries go to `target`, as does everything reported afterwards.
/// Discarded entries are dropped.
struct HeldDiagnostics {
    target: Arc<dyn DiagnosticSink>,
    held: Mutex<Option<Vec<Diagnostic>>>,
}

impl HeldDiagnostics {
    fn new(target: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            target,
            held: Mutex::new(Some(Vec::new())),
        }
    }

    fn release(&self) {
        let held = lock_recovering(&self.held, "held diagnostics").take();
        for diagnostic in held.unwrap_or_default() {
            self.target.report(diagnostic);
        }
    }

    fn discard(&self) {
        if let Some(held) = lock_recovering(&self.held, "held diagnostics").as_mut() {
            held.clear();
        }
    }
}

impl DiagnosticSink for HeldDiagnostics {
    fn report(&self, diagnostic: Diagnostic) {
        {
            let mut held = lock_recovering(&self.held, "held diagnostics");
            if let Some(entries) = held.as_mut() {
                entries.push(diagnostic);
                return;
            }
        }
        self.target.report(diagnostic);
    }
}

pub struct ModuleTracker {
    config: TrackerConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
    services: Option<Arc<dyn ServiceRegistry>>,
    managed: RwLock<Vec<ModuleHandle>>,
}

impl fmt::Debug for ModuleTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleTracker")
            .field("process_type", &self.config.process_type)
            .field("components_header", &self.config.components_header)
            .field("managed", &self.len())
            .finish()
    }
}

impl ModuleTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            diagnostics: Arc::new(LogSink),
            services: None,
            managed: RwLock::new(Vec::new()),
        }
    }

    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Publish components that declare service contracts to `registry`
    pub fn with_service_registry(mut self, registry: Arc<dyn ServiceRegistry>) -> Self {
        self.services = Some(registry);
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn process_type(&self) -> &str {
        &self.config.process_type
    }

    /// True while a managed module exists for `module`
    pub fn is_managed(&self, module: &dyn Module) -> bool {
        self.find(module.id()).is_some()
    }

    /// The managed module tracked for `id`
    pub fn find(&self, id: ModuleId) -> Option<ModuleHandle> {
        read_recovering(&self.managed, "tracked modules")
            .iter()
            .find(|managed| managed.id() == id)
            .cloned()
    }

    /// Snapshot of the tracked modules in the order they were added
    pub fn managed_modules(&self) -> Vec<ModuleHandle> {
        read_recovering(&self.managed, "tracked modules").clone()
    }

    pub fn len(&self) -> usize {
        read_recovering(&self.managed, "tracked modules").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn discoverer(&self, diagnostics: Arc<dyn DiagnosticSink>) -> ComponentDiscoverer {
        let discoverer = ComponentDiscoverer::new(self.config.process_type.clone())
            .with_diagnostics(diagnostics);
        match &self.services {
            Some(registry) => discoverer.with_service_registry(Arc::clone(registry)),
            None => discoverer,
        }
    }

    fn report_duplicate(&self, module: &dyn Module) {
        self.diagnostics.report(
            Diagnostic::new(
                MessageCode::DuplicateModule,
                format!(
                    "Module '{}' ({}) is already tracked; ignoring repeated add",
                    module.symbolic_name(),
                    module.id()
                ),
            )
            .with_module(module.id()),
        );
    }

    fn track(&self, managed: &ModuleHandle) -> Result<bool, ComponentError> {
        let mut tracked = write_lock(&self.managed, "tracked modules", |message| {
            ComponentError::Synchronization { message }
        })?;
        if tracked.iter().any(|existing| existing.id() == managed.id()) {
            return Ok(false);
        }
        tracked.push(Arc::clone(managed));
        Ok(true)
    }

    fn untrack(&self, managed: &ModuleHandle) -> Result<(), ComponentError> {
        let mut tracked = write_lock(&self.managed, "tracked modules", |message| {
            ComponentError::Synchronization { message }
        })?;
        tracked.retain(|existing| !Arc::ptr_eq(existing, managed));
        Ok(())
    }
}

impl ModuleListener for ModuleTracker {
    type Handle = ModuleHandle;

    fn adding_module(&self, module: Arc<dyn Module>, event: Option<ModuleEvent>) -> Option<ModuleHandle> {
        let Some(declared) = module.header(&self.config.components_header) else {
            log::trace!(
                "Module '{}' has no {} header; not tracked",
                module.symbolic_name(),
                self.config.components_header
            );
            return None;
        };
        if self.is_managed(module.as_ref()) {
            self.report_duplicate(module.as_ref());
            return None;
        }

        let type_ids = parse_component_list(declared);
        log::debug!(
            "Adding module '{}' ({}) on {}: {} declared component types",
            module.symbolic_name(),
            module.id(),
            event.map_or_else(|| "initial scan".to_string(), |e| e.to_string()),
            type_ids.len()
        );
        // A racing add of the same module may win; its discovery reports count, ours don't
        let pending = Arc::new(HeldDiagnostics::new(Arc::clone(&self.diagnostics)));
        let outcome = self
            .discoverer(Arc::clone(&pending) as Arc<dyn DiagnosticSink>)
            .discover_all(module.as_ref(), &type_ids);
        let managed = Arc::new(ManagedModule::new(
            Arc::clone(&module),
            outcome.managers,
            outcome.errors,
            Arc::clone(&self.diagnostics),
        ));

        match self.track(&managed) {
            Ok(true) => pending.release(),
            Ok(false) => {
                pending.discard();
                self.report_duplicate(module.as_ref());
                return None;
            }
            Err(error) => {
                pending.discard();
                self.diagnostics
                    .report(Diagnostic::from_error(Some(module.id()), &error));
                return None;
            }
        }

        managed.start_components(&self.config);
        Some(managed)
    }

    fn modified_module(&self, module: &Arc<dyn Module>, event: Option<ModuleEvent>, _handle: &ModuleHandle) {
        // Declared components are fixed at add time
        log::debug!(
            "Module '{}' ({}) modified ({:?}); declared components are not re-evaluated",
            module.symbolic_name(),
            module.id(),
            event
        );
    }

    fn removed_module(&self, module: &Arc<dyn Module>, event: Option<ModuleEvent>, handle: Option<ModuleHandle>) {
        let Some(managed) = handle else {
            return;
        };
        log::debug!(
            "Removing module '{}' ({}) on {:?}",
            module.symbolic_name(),
            module.id(),
            event
        );
        managed.stop_components();
        if let Err(error) = self.untrack(&managed) {
            self.diagnostics
                .report(Diagnostic::from_error(Some(module.id()), &error));
        }
    }
}
