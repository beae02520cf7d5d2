//! Host simulator
//!
//! Plays the role of the module-loading subsystem: it owns the loaded
//! modules, delivers add/modify/remove callbacks to a [`ModuleListener`] and
//! keeps whatever handle the listener returned until the module goes away.

use crate::component::api::ModuleId;
use crate::module::api::{Module, ModuleEvent, ModuleListener};
use std::sync::Arc;

struct Loaded<H> {
    module: Arc<dyn Module>,
    handle: Option<H>,
}

pub struct ModuleHost<L: ModuleListener> {
    listener: Arc<L>,
    loaded: Vec<Loaded<L::Handle>>,
}

impl<L: ModuleListener> ModuleHost<L> {
    pub fn new(listener: Arc<L>) -> Self {
        Self {
            listener,
            loaded: Vec::new(),
        }
    }

    pub fn listener(&self) -> &Arc<L> {
        &self.listener
    }

    /// Load `module` and notify the listener.
    ///
    /// Returns `true` when the listener started tracking it. A module whose
    /// id is already loaded is refused.
    pub fn install(&mut self, module: Arc<dyn Module>, event: Option<ModuleEvent>) -> bool {
        if self.position(module.id()).is_some() {
            log::warn!(
                "Module '{}' ({}) is already loaded",
                module.symbolic_name(),
                module.id()
            );
            return false;
        }
        let handle = self.listener.adding_module(Arc::clone(&module), event);
        let tracked = handle.is_some();
        log::info!(
            "Installed module '{}' ({}){}",
            module.symbolic_name(),
            module.id(),
            if tracked { "" } else { " [not tracked]" }
        );
        self.loaded.push(Loaded { module, handle });
        tracked
    }

    /// Replace a loaded module's metadata and notify the listener if it tracks it
    pub fn update(&mut self, module: Arc<dyn Module>) -> bool {
        let Some(index) = self.position(module.id()) else {
            return false;
        };
        let entry = &mut self.loaded[index];
        entry.module = module;
        if let Some(handle) = &entry.handle {
            self.listener
                .modified_module(&entry.module, Some(ModuleEvent::Updated), handle);
        }
        true
    }

    /// Unload a module, handing its handle back to the listener
    pub fn uninstall(&mut self, id: ModuleId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let Loaded { module, handle } = self.loaded.remove(index);
        self.listener
            .removed_module(&module, Some(ModuleEvent::Uninstalled), handle);
        log::info!("Uninstalled module '{}' ({})", module.symbolic_name(), id);
        true
    }

    /// Unload every module, most recently installed first
    pub fn uninstall_all(&mut self) {
        while let Some(Loaded { module, handle }) = self.loaded.pop() {
            self.listener
                .removed_module(&module, Some(ModuleEvent::Uninstalled), handle);
            log::info!(
                "Uninstalled module '{}' ({})",
                module.symbolic_name(),
                module.id()
            );
        }
    }

    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.loaded.iter().map(|entry| entry.module.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty()
    }

    fn position(&self, id: ModuleId) -> Option<usize> {
        self.loaded.iter().position(|entry| entry.module.id() == id)
    }
}
