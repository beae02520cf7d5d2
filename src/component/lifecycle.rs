//! Lifecycle Manager
//!
//! Wraps exactly one component instance and drives it through
//!
//! ```text
//! Uninitialized → Initializing → Initialized → Starting → Started
//!               → Stopping → Stopped → Destroying → Destroyed
//! ```
//!
//! The state and the stop-action stack share one mutex. The lock is never
//! held while component code or a stop action runs, so a component may call
//! back into its own manager (typically to register stop actions) from
//! `do_start`.
//!
//! Teardown is best effort: `stop()` is accepted from any state before
//! `Stopping` and `destroy()` from any state before `Destroying`, so a
//! component whose initialize or start failed can still release what it
//! acquired. Every other transition requires the immediately preceding state.

use crate::component::diagnostics::{Diagnostic, DiagnosticSink, LogSink};
use crate::component::error::{ComponentError, ComponentResult};
use crate::component::services::ServiceRegistry;
use crate::component::traits::Component;
use crate::component::types::{component_name, ComponentConfig, ModuleId, State};
use crate::core::panic::{contain_fallible, BoxError};
use crate::core::sync::{lock_mutex, lock_recovering};
use std::fmt;
use std::sync::{Arc, Mutex};

type StopAction = Box<dyn FnOnce() -> Result<(), BoxError> + Send + 'static>;

struct LifecycleInner {
    state: State,
    stop_actions: Vec<StopAction>,
}

/// Registration point for stop actions, handed to `Component::do_start`
///
/// Cloning yields another handle to the same stack. Registration only
/// succeeds while the owning component is `Starting`.
#[derive(Clone)]
pub struct StopActions {
    component: Arc<str>,
    inner: Arc<Mutex<LifecycleInner>>,
}

impl StopActions {
    fn new(component: &str) -> Self {
        Self {
            component: Arc::from(component),
            inner: Arc::new(Mutex::new(LifecycleInner {
                state: State::Uninitialized,
                stop_actions: Vec::new(),
            })),
        }
    }

    /// Register an infallible cleanup callback
    pub fn add(&self, action: impl FnOnce() + Send + 'static) -> ComponentResult<()> {
        self.add_fallible(move || {
            action();
            Ok(())
        })
    }

    /// Register a cleanup callback whose failure is logged on stop
    pub fn add_fallible(
        &self,
        action: impl FnOnce() -> Result<(), BoxError> + Send + 'static,
    ) -> ComponentResult<()> {
        let mut inner = self.lock()?;
        if inner.state != State::Starting {
            return Err(ComponentError::IllegalState {
                component: self.component.to_string(),
                operation: "add a stop action",
                state: inner.state,
            });
        }
        inner.stop_actions.push(Box::new(action));
        Ok(())
    }

    /// Number of registered actions that have not run yet
    pub fn pending(&self) -> usize {
        lock_recovering(&self.inner, "lifecycle state").stop_actions.len()
    }

    fn lock(&self) -> ComponentResult<std::sync::MutexGuard<'_, LifecycleInner>> {
        lock_mutex(&self.inner, "lifecycle state", |message| {
            ComponentError::Synchronization { message }
        })
    }

    fn state(&self) -> State {
        lock_recovering(&self.inner, "lifecycle state").state
    }

    fn pop(&self) -> ComponentResult<Option<StopAction>> {
        Ok(self.lock()?.stop_actions.pop())
    }
}

impl fmt::Debug for StopActions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopActions")
            .field("component", &self.component)
            .field("pending", &self.pending())
            .finish()
    }
}

/// State machine around one component instance
pub struct LifecycleManager {
    name: String,
    type_id: String,
    module: ModuleId,
    component: Arc<dyn Component>,
    contracts: Vec<String>,
    services: Option<Arc<dyn ServiceRegistry>>,
    diagnostics: Arc<dyn DiagnosticSink>,
    stop_actions: StopActions,
}

impl fmt::Debug for LifecycleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleManager")
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("module", &self.module)
            .field("state", &self.state())
            .field("contracts", &self.contracts)
            .finish()
    }
}

impl LifecycleManager {
    /// Wrap a freshly created component. No lifecycle method is called.
    pub fn new(
        type_id: impl Into<String>,
        module: ModuleId,
        component: Arc<dyn Component>,
        contracts: Vec<String>,
    ) -> Self {
        let name = component_name(component.type_name());
        let stop_actions = StopActions::new(&name);
        Self {
            name,
            type_id: type_id.into(),
            module,
            component,
            contracts,
            services: None,
            diagnostics: Arc::new(LogSink),
            stop_actions,
        }
    }

    /// Publish the component to `registry` once started
    pub fn with_service_registry(mut self, registry: Arc<dyn ServiceRegistry>) -> Self {
        self.services = Some(registry);
        self
    }

    /// Report stop-action failures to `sink` instead of the log
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// `LC_` followed by the component's simple type name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn contracts(&self) -> &[String] {
        &self.contracts
    }

    pub fn component(&self) -> &Arc<dyn Component> {
        &self.component
    }

    pub fn state(&self) -> State {
        self.stop_actions.state()
    }

    /// Handle for registering stop actions from outside `do_start`
    pub fn stop_actions(&self) -> StopActions {
        self.stop_actions.clone()
    }

    pub fn pending_stop_actions(&self) -> usize {
        self.stop_actions.pending()
    }

    /// Register a stop action; fails with `IllegalState` unless `Starting`
    pub fn add_stop_action(&self, action: impl FnOnce() + Send + 'static) -> ComponentResult<()> {
        self.stop_actions.add(action)
    }

    /// Run `do_initialize`. Only valid from `Uninitialized`.
    ///
    /// On failure the component stays `Initializing`.
    pub fn initialize(&self, config: &ComponentConfig) -> ComponentResult<()> {
        self.enter("initialize", |state| state == State::Uninitialized, State::Initializing)?;
        let component = &self.component;
        contain_fallible(|| component.do_initialize(config)).map_err(|source| {
            ComponentError::Configuration {
                component: self.name.clone(),
                source,
            }
        })?;
        self.enter("initialize", |state| state == State::Initializing, State::Initialized)
    }

    /// Run `do_start`, then publish declared services. Only valid from `Initialized`.
    ///
    /// On failure the component stays `Starting`; stop actions registered
    /// before the failure are kept and run by a later `stop()`. A refused
    /// service registration is a start failure like any other.
    pub fn start(&self) -> ComponentResult<()> {
        self.enter("start", |state| state == State::Initialized, State::Starting)?;
        let component = &self.component;
        let stop_actions = &self.stop_actions;
        contain_fallible(|| component.do_start(stop_actions)).map_err(|source| {
            ComponentError::Runtime {
                component: self.name.clone(),
                source,
            }
        })?;
        self.publish().map_err(|e| ComponentError::Runtime {
            component: self.name.clone(),
            source: Box::new(e),
        })?;
        self.enter("start", |state| state == State::Starting, State::Started)
    }

    /// Run every stop action, most recently registered first.
    ///
    /// Each action is isolated: failures and panics are reported to the
    /// diagnostic channel and the remaining actions still run. Valid from any
    /// state before `Stopping`.
    pub fn stop(&self) -> ComponentResult<()> {
        self.enter("stop", |state| state < State::Stopping, State::Stopping)?;
        while let Some(action) = self.stop_actions.pop()? {
            if let Err(source) = contain_fallible(action) {
                let error = ComponentError::StopAction {
                    component: self.name.clone(),
                    source,
                };
                self.diagnostics
                    .report(Diagnostic::from_error(Some(self.module), &error).with_type_id(&self.type_id));
            }
        }
        self.enter("stop", |state| state == State::Stopping, State::Stopped)
    }

    /// Run `do_destroy`. Valid from any state before `Destroying`.
    ///
    /// A panic in `do_destroy` propagates to the caller and leaves the
    /// component `Destroying`.
    pub fn destroy(&self) -> ComponentResult<()> {
        self.enter("destroy", |state| state < State::Destroying, State::Destroying)?;
        self.component.do_destroy();
        self.enter("destroy", |state| state == State::Destroying, State::Destroyed)
    }

    fn publish(&self) -> ComponentResult<()> {
        let Some(registry) = &self.services else {
            return Ok(());
        };
        if self.contracts.is_empty() {
            return Ok(());
        }
        let handle = registry.register(&self.contracts, Arc::clone(&self.component), self.module)?;
        let registry = Arc::clone(registry);
        self.stop_actions.add(move || registry.unregister(handle))
    }

    fn enter(
        &self,
        operation: &'static str,
        allowed: impl FnOnce(State) -> bool,
        next: State,
    ) -> ComponentResult<()> {
        let mut inner = self.stop_actions.lock()?;
        if !allowed(inner.state) {
            return Err(ComponentError::IllegalState {
                component: self.name.clone(),
                operation,
                state: inner.state,
            });
        }
        log::trace!("{}: {} -> {}", self.name, inner.state, next);
        inner.state = next;
        Ok(())
    }
}
