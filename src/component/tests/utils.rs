//! Component Test Utilities
//!
//! Scripted components and small registries shared by the component and
//! module test suites.

use crate::component::api::{BoxError, Component, ComponentConfig, ComponentType, StopActions, TypeRegistry};
use std::sync::{Arc, Mutex};

/// Ordered record of lifecycle events, shared between a test and its components
#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Component whose behaviour in each phase is set by the test
#[derive(Debug, Default)]
pub struct ScriptedComponent {
    pub log: EventLog,
    pub stop_actions: usize,
    pub fail_initialize: bool,
    pub fail_start: bool,
    pub panic_in_start: bool,
    pub failing_stop_action: Option<usize>,
    pub panicking_stop_action: Option<usize>,
    /// Handle kept from `do_start` so tests can try late registrations
    pub kept_handle: Mutex<Option<StopActions>>,
}

impl ScriptedComponent {
    pub fn new(log: &EventLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }

    pub fn with_stop_actions(mut self, count: usize) -> Self {
        self.stop_actions = count;
        self
    }

    pub fn failing_initialize(mut self) -> Self {
        self.fail_initialize = true;
        self
    }

    pub fn failing_start(mut self) -> Self {
        self.fail_start = true;
        self
    }

    pub fn panicking_start(mut self) -> Self {
        self.panic_in_start = true;
        self
    }

    pub fn with_failing_stop_action(mut self, index: usize) -> Self {
        self.failing_stop_action = Some(index);
        self
    }

    pub fn with_panicking_stop_action(mut self, index: usize) -> Self {
        self.panicking_stop_action = Some(index);
        self
    }
}

impl Component for ScriptedComponent {
    fn do_initialize(&self, _config: &ComponentConfig) -> Result<(), BoxError> {
        self.log.push("initialize");
        if self.fail_initialize {
            return Err("missing setting".into());
        }
        Ok(())
    }

    fn do_start(&self, stop_actions: &StopActions) -> Result<(), BoxError> {
        self.log.push("start");
        *self.kept_handle.lock().unwrap() = Some(stop_actions.clone());
        for index in 0..self.stop_actions {
            let log = self.log.clone();
            let fails = self.failing_stop_action == Some(index);
            let panics = self.panicking_stop_action == Some(index);
            stop_actions.add_fallible(move || {
                log.push(format!("stop-action-{index}"));
                if panics {
                    panic!("stop action {index} panicked");
                }
                if fails {
                    return Err(format!("stop action {index} failed").into());
                }
                Ok(())
            })?;
        }
        if self.panic_in_start {
            panic!("start blew up");
        }
        if self.fail_start {
            return Err("port already in use".into());
        }
        Ok(())
    }

    fn do_destroy(&self) {
        self.log.push("destroy");
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

macro_rules! plain_component {
    ($($name:ident),*) => {
        $(
            #[derive(Debug, Default)]
            pub struct $name;

            impl Component for $name {
                fn as_any(&self) -> &dyn std::any::Any {
                    self
                }
            }
        )*
    };
}

plain_component!(Alpha, Beta, Gamma);

/// Component type whose factory panics
pub fn exploding_factory() -> Result<Arc<dyn Component>, BoxError> {
    panic!("constructor exploded")
}

/// Component type whose factory reports an error
pub fn refusing_factory() -> Result<Arc<dyn Component>, BoxError> {
    Err("license check failed".into())
}

/// Registry with `test.Alpha`, `test.Beta` and `test.Gamma`
pub fn abc_registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(ComponentType::of::<Alpha>("test.Alpha"))
        .with(ComponentType::of::<Beta>("test.Beta"))
        .with(ComponentType::of::<Gamma>("test.Gamma"))
}

/// Fails `do_initialize`
#[derive(Debug, Default)]
pub struct RejectsConfig;

impl Component for RejectsConfig {
    fn do_initialize(&self, config: &ComponentConfig) -> Result<(), BoxError> {
        match config.get_str("mode") {
            Some("strict") => Ok(()),
            _ => Err("mode must be 'strict'".into()),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Fails `do_start` after registering one stop action
#[derive(Debug, Default)]
pub struct FailsToStart;

impl Component for FailsToStart {
    fn do_start(&self, stop_actions: &StopActions) -> Result<(), BoxError> {
        stop_actions.add(|| {})?;
        Err("port already in use".into())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Registers two stop actions on start
#[derive(Debug, Default)]
pub struct HoldsResources;

impl Component for HoldsResources {
    fn do_start(&self, stop_actions: &StopActions) -> Result<(), BoxError> {
        stop_actions.add(|| log::trace!("releasing socket"))?;
        stop_actions.add(|| log::trace!("releasing timer"))?;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Panics in `do_destroy`
#[derive(Debug, Default)]
pub struct PanicsOnDestroy;

impl Component for PanicsOnDestroy {
    fn do_destroy(&self) {
        panic!("destroy blew up");
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
