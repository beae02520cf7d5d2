//! Shared helpers for the integration tests

#![allow(dead_code)]

use modlife::component::api::{BoxError, Component, ModuleId, StopActions, TypeRegistry};
use modlife::module::api::{Module, StaticModule};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Number of `CountingComponent` stop actions that ran, process-wide
pub static RELEASED: AtomicUsize = AtomicUsize::new(0);

/// Registers one stop action that bumps [`RELEASED`]
#[derive(Debug, Default)]
pub struct CountingComponent;

impl Component for CountingComponent {
    fn do_start(&self, stop_actions: &StopActions) -> Result<(), BoxError> {
        stop_actions.add(|| {
            RELEASED.fetch_add(1, Ordering::SeqCst);
        })?;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Only applies to deployment managers
#[derive(Debug, Default)]
pub struct DeploymentOnlyComponent;

impl Component for DeploymentOnlyComponent {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

modlife::component_type!(CountingComponent => "it.counting");
modlife::component_type!(DeploymentOnlyComponent => "it.deployment_only",
    process_types = ["DeploymentManager"], services = ["it.Deployment"]);

/// Registry of every link-time type, demo types included
pub fn linked_types() -> Arc<TypeRegistry> {
    Arc::new(TypeRegistry::from_inventory())
}

pub fn module(id: u64, components: &str) -> Arc<dyn Module> {
    Arc::new(
        StaticModule::new(ModuleId(id), format!("it.module{id}"), linked_types())
            .with_components(components),
    )
}
