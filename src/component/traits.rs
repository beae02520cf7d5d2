//! Component Trait
//!
//! The capability set every managed component implements. All hooks have
//! empty defaults so a component only overrides the phases it cares about.
//!
//! # Lifecycle
//!
//! A component is driven by its [`LifecycleManager`](crate::component::lifecycle::LifecycleManager):
//!
//! 1. `do_initialize` once, with the settings configured for its type
//! 2. `do_start` once; cleanup for everything acquired here is registered
//!    through [`StopActions::add`] and runs in reverse order on stop
//! 3. `do_destroy` once, after all stop actions ran
//!
//! Hooks take `&self`: the same instance may be published to a service
//! registry and shared with other threads, so components keep mutable state
//! behind their own locks.

use crate::component::lifecycle::StopActions;
use crate::component::types::ComponentConfig;
use crate::core::panic::BoxError;

pub trait Component: Send + Sync + 'static {
    /// Prepare the component. A failure leaves it `Initializing` and excludes
    /// it from the rest of its module's start batch.
    fn do_initialize(&self, _config: &ComponentConfig) -> Result<(), BoxError> {
        Ok(())
    }

    /// Start the component, registering cleanup with `stop_actions`
    fn do_start(&self, _stop_actions: &StopActions) -> Result<(), BoxError> {
        Ok(())
    }

    /// Release whatever outlives the stop actions
    fn do_destroy(&self) {}

    /// Fully qualified name of the concrete type; the component name is derived from it
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Downcasting support for service consumers
    fn as_any(&self) -> &dyn std::any::Any;
}
