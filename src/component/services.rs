//! Service publication
//!
//! Components that declare service contracts are published to a
//! [`ServiceRegistry`] once they have started, and withdrawn first thing on
//! stop.

use crate::component::error::{ComponentError, ComponentResult};
use crate::component::traits::Component;
use crate::component::types::{component_name, ModuleId};
use crate::core::sync::{read_recovering, write_lock};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Opaque token returned by [`ServiceRegistry::register`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationHandle(u64);

impl RegistrationHandle {
    /// Handles are minted by [`ServiceRegistry`] implementations
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Directory that components are published to
pub trait ServiceRegistry: Send + Sync {
    /// Publish `instance` under every contract in `contracts` on behalf of `module`
    fn register(
        &self,
        contracts: &[String],
        instance: Arc<dyn Component>,
        module: ModuleId,
    ) -> ComponentResult<RegistrationHandle>;

    /// Withdraw a registration. Unknown handles are ignored.
    fn unregister(&self, handle: RegistrationHandle);

    /// Every instance currently published under `contract`, in registration order
    fn lookup(&self, contract: &str) -> Vec<Arc<dyn Component>>;
}

struct Registration {
    contracts: Vec<String>,
    instance: Arc<dyn Component>,
    module: ModuleId,
}

/// Thread-safe in-process [`ServiceRegistry`]
#[derive(Default)]
pub struct InMemoryServiceRegistry {
    next_id: AtomicU64,
    registrations: RwLock<BTreeMap<RegistrationHandle, Registration>>,
}

impl std::fmt::Debug for InMemoryServiceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryServiceRegistry")
            .field("registrations", &self.len())
            .finish()
    }
}

impl InMemoryServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live registrations
    pub fn len(&self) -> usize {
        read_recovering(&self.registrations, "service registrations").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Contracts published on behalf of `module`
    pub fn contracts_of(&self, module: ModuleId) -> Vec<String> {
        read_recovering(&self.registrations, "service registrations")
            .values()
            .filter(|registration| registration.module == module)
            .flat_map(|registration| registration.contracts.iter().cloned())
            .collect()
    }
}

impl ServiceRegistry for InMemoryServiceRegistry {
    fn register(
        &self,
        contracts: &[String],
        instance: Arc<dyn Component>,
        module: ModuleId,
    ) -> ComponentResult<RegistrationHandle> {
        if contracts.iter().any(|contract| contract.trim().is_empty()) {
            return Err(ComponentError::Publication {
                component: component_name(instance.type_name()),
                contracts: contracts.to_vec(),
                reason: "contract identifiers must not be empty".to_string(),
            });
        }

        let handle = RegistrationHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        let mut registrations = write_lock(&self.registrations, "service registrations", |message| {
            ComponentError::Synchronization { message }
        })?;
        log::debug!(
            "Publishing {} under {:?} for module {} (registration {})",
            component_name(instance.type_name()),
            contracts,
            module,
            handle.id()
        );
        registrations.insert(
            handle,
            Registration {
                contracts: contracts.to_vec(),
                instance,
                module,
            },
        );
        Ok(handle)
    }

    fn unregister(&self, handle: RegistrationHandle) {
        let removed = match self.registrations.write() {
            Ok(mut registrations) => registrations.remove(&handle),
            Err(poisoned) => poisoned.into_inner().remove(&handle),
        };
        if let Some(registration) = removed {
            log::debug!(
                "Withdrew {} from {:?} (registration {})",
                component_name(registration.instance.type_name()),
                registration.contracts,
                handle.id()
            );
        }
    }

    fn lookup(&self, contract: &str) -> Vec<Arc<dyn Component>> {
        read_recovering(&self.registrations, "service registrations")
            .values()
            .filter(|registration| registration.contracts.iter().any(|c| c == contract))
            .map(|registration| Arc::clone(&registration.instance))
            .collect()
    }
}
