//! Module tracker tests

use crate::component::api::{
    ComponentConfig, ComponentError, ComponentType, InMemoryServiceRegistry, MessageCode, ModuleId,
    RecordingSink, ServiceRegistry, State, TypeRegistry,
};
use crate::component::tests::utils::{
    abc_registry, Alpha, FailsToStart, HoldsResources, PanicsOnDestroy, RejectsConfig,
};
use crate::module::api::{
    Module, ModuleEvent, ModuleListener, ModuleTracker, StaticModule, TrackerConfig,
};
use std::sync::Arc;

fn scope() -> Arc<TypeRegistry> {
    Arc::new(
        abc_registry()
            .with(ComponentType::of::<RejectsConfig>("test.RejectsConfig"))
            .with(ComponentType::of::<FailsToStart>("test.FailsToStart"))
            .with(ComponentType::of::<HoldsResources>("test.HoldsResources"))
            .with(ComponentType::of::<PanicsOnDestroy>("test.PanicsOnDestroy"))
            .with(ComponentType::of::<Alpha>("test.Published").services(&["alpha.Api"]))
            .with(ComponentType::of::<Alpha>("test.AgentOnly").process_types(&["NodeAgent"])),
    )
}

fn module(id: u64, components: &str) -> Arc<dyn Module> {
    Arc::new(StaticModule::new(ModuleId(id), format!("test.module{id}"), scope()).with_components(components))
}

fn tracker_with_sink() -> (ModuleTracker, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::new());
    let tracker = ModuleTracker::new(TrackerConfig::new("ManagedProcess")).with_diagnostics(sink.clone());
    (tracker, sink)
}

fn states(tracker: &ModuleTracker, id: u64) -> Vec<State> {
    tracker
        .find(ModuleId(id))
        .map(|managed| managed.components().iter().map(|m| m.state()).collect())
        .unwrap_or_default()
}

#[test]
fn test_module_without_header_is_not_tracked() {
    let (tracker, sink) = tracker_with_sink();
    let plain: Arc<dyn Module> = Arc::new(StaticModule::new(ModuleId(1), "plain", scope()));

    assert!(tracker.adding_module(Arc::clone(&plain), Some(ModuleEvent::Installed)).is_none());
    assert!(!tracker.is_managed(plain.as_ref()));
    assert!(tracker.is_empty());
    assert!(sink.entries().is_empty());
}

#[test]
fn test_unresolvable_type_is_isolated_within_module() {
    let (tracker, sink) = tracker_with_sink();
    let abc = module(1, "test.Alpha, test.Missing, test.Gamma");

    let handle = tracker.adding_module(abc, Some(ModuleEvent::Started)).unwrap();

    let names: Vec<&str> = handle.components().iter().map(|m| m.name()).collect();
    assert_eq!(names, vec!["LC_Alpha", "LC_Gamma"]);
    assert_eq!(states(&tracker, 1), vec![State::Started, State::Started]);

    let errors = handle.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].type_id(), Some("test.Missing"));
    assert_eq!(sink.count(MessageCode::ResolutionFailed), 1);
}

#[test]
fn test_is_managed_follows_add_and_remove() {
    let (tracker, _sink) = tracker_with_sink();
    let abc = module(1, "test.Alpha");

    let handle = tracker.adding_module(Arc::clone(&abc), None);
    assert!(handle.is_some());
    assert!(tracker.is_managed(abc.as_ref()));

    tracker.removed_module(&abc, Some(ModuleEvent::Uninstalled), handle);
    assert!(!tracker.is_managed(abc.as_ref()));
    assert!(tracker.is_empty());
}

#[test]
fn test_module_with_no_usable_components_is_still_tracked() {
    let (tracker, _sink) = tracker_with_sink();
    let empty = module(1, "");
    let missing = module(2, "test.Missing");

    let empty_handle = tracker.adding_module(Arc::clone(&empty), None).unwrap();
    let missing_handle = tracker.adding_module(Arc::clone(&missing), None).unwrap();

    assert!(empty_handle.components().is_empty());
    assert!(missing_handle.components().is_empty());
    assert_eq!(missing_handle.errors().len(), 1);
    assert!(tracker.is_managed(empty.as_ref()));
    assert!(tracker.is_managed(missing.as_ref()));
}

#[test]
fn test_start_failures_do_not_block_siblings() {
    let (tracker, sink) = tracker_with_sink();
    let mixed = module(1, "test.FailsToStart test.Alpha test.RejectsConfig test.HoldsResources");

    let handle = tracker.adding_module(mixed, None).unwrap();

    assert_eq!(
        states(&tracker, 1),
        vec![State::Starting, State::Started, State::Initializing, State::Started]
    );
    let errors = handle.errors();
    assert_eq!(errors.len(), 2);
    assert!(matches!(errors[0].as_ref(), ComponentError::Runtime { .. }));
    assert!(matches!(errors[1].as_ref(), ComponentError::Configuration { .. }));
    assert_eq!(sink.count(MessageCode::StartFailed), 1);
    assert_eq!(sink.count(MessageCode::InitializeFailed), 1);
}

#[test]
fn test_component_settings_are_passed_to_initialize() {
    let sink = Arc::new(RecordingSink::new());
    let mut settings = toml::Table::new();
    settings.insert("mode".to_string(), toml::Value::String("strict".to_string()));
    let config = TrackerConfig::new("ManagedProcess")
        .with_component_settings("test.RejectsConfig", ComponentConfig::new(settings));
    let tracker = ModuleTracker::new(config).with_diagnostics(sink.clone());

    tracker.adding_module(module(1, "test.RejectsConfig"), None).unwrap();

    assert_eq!(states(&tracker, 1), vec![State::Started]);
    assert!(sink.entries().is_empty());
}

#[test]
fn test_removal_tears_down_every_component() {
    let (tracker, _sink) = tracker_with_sink();
    let mixed = module(1, "test.FailsToStart test.RejectsConfig test.HoldsResources");

    let handle = tracker.adding_module(Arc::clone(&mixed), None).unwrap();
    let managed = Arc::clone(&handle);
    tracker.removed_module(&mixed, Some(ModuleEvent::Stopping), Some(handle));

    assert!(managed.components().iter().all(|m| m.state() == State::Destroyed));
    assert!(managed.components().iter().all(|m| m.pending_stop_actions() == 0));
}

#[test]
fn test_panicking_destroy_is_contained() {
    let (tracker, sink) = tracker_with_sink();
    let fragile = module(1, "test.PanicsOnDestroy test.Alpha");

    let handle = tracker.adding_module(Arc::clone(&fragile), None).unwrap();
    let managed = Arc::clone(&handle);
    tracker.removed_module(&fragile, None, Some(handle));

    let components = managed.components();
    assert_eq!(components[0].state(), State::Destroying);
    assert_eq!(components[1].state(), State::Destroyed);
    assert_eq!(sink.count(MessageCode::TeardownFailed), 1);
    assert!(!tracker.is_managed(fragile.as_ref()));
}

#[test]
fn test_readding_creates_fresh_stop_action_stacks() {
    let (tracker, _sink) = tracker_with_sink();
    let resources = module(1, "test.HoldsResources");

    let first = tracker.adding_module(Arc::clone(&resources), None).unwrap();
    assert_eq!(first.components()[0].pending_stop_actions(), 2);
    let first_managed = Arc::clone(&first);
    tracker.removed_module(&resources, None, Some(first));
    assert_eq!(first_managed.components()[0].pending_stop_actions(), 0);

    let second = tracker.adding_module(Arc::clone(&resources), None).unwrap();
    assert!(!Arc::ptr_eq(&first_managed, &second));
    assert!(!Arc::ptr_eq(
        first_managed.components()[0].component(),
        second.components()[0].component()
    ));
    assert_eq!(second.components()[0].state(), State::Started);
    assert_eq!(second.components()[0].pending_stop_actions(), 2);
}

#[test]
fn test_duplicate_add_is_rejected() {
    let (tracker, sink) = tracker_with_sink();
    let abc = module(1, "test.Alpha");

    let first = tracker.adding_module(Arc::clone(&abc), None);
    let second = tracker.adding_module(Arc::clone(&abc), None);

    assert!(first.is_some());
    assert!(second.is_none());
    assert_eq!(tracker.len(), 1);
    assert_eq!(sink.count(MessageCode::DuplicateModule), 1);
}

#[test]
fn test_modification_is_not_reevaluated() {
    let (tracker, _sink) = tracker_with_sink();
    let original = module(1, "test.Alpha");
    let handle = tracker.adding_module(original, None).unwrap();

    let updated = module(1, "test.Alpha test.Beta test.Gamma");
    tracker.modified_module(&updated, Some(ModuleEvent::Updated), &handle);

    assert_eq!(handle.components().len(), 1);
    assert_eq!(states(&tracker, 1), vec![State::Started]);
}

#[test]
fn test_removal_without_handle_is_ignored() {
    let (tracker, _sink) = tracker_with_sink();
    let abc = module(1, "test.Alpha");
    tracker.adding_module(Arc::clone(&abc), None).unwrap();

    tracker.removed_module(&abc, None, None);
    assert!(tracker.is_managed(abc.as_ref()));
    assert_eq!(states(&tracker, 1), vec![State::Started]);
}

#[test]
fn test_services_are_published_and_withdrawn() {
    let services = Arc::new(InMemoryServiceRegistry::new());
    let tracker = ModuleTracker::new(TrackerConfig::new("ManagedProcess"))
        .with_service_registry(services.clone());
    let published = module(1, "test.Published test.Alpha");

    let handle = tracker.adding_module(Arc::clone(&published), None).unwrap();
    assert_eq!(services.lookup("alpha.Api").len(), 1);
    assert_eq!(services.contracts_of(ModuleId(1)), vec!["alpha.Api".to_string()]);
    assert!(Arc::ptr_eq(
        &services.lookup("alpha.Api")[0],
        handle.components()[0].component()
    ));

    tracker.removed_module(&published, None, Some(handle));
    assert!(services.lookup("alpha.Api").is_empty());
    assert!(services.is_empty());
}

#[test]
fn test_process_type_filter_applies_per_tracker() {
    let (tracker, sink) = tracker_with_sink();
    let handle = tracker.adding_module(module(1, "test.AgentOnly test.Alpha"), None).unwrap();
    assert_eq!(handle.components().len(), 1);
    assert_eq!(handle.components()[0].type_id(), "test.Alpha");
    assert!(handle.errors().is_empty());
    assert_eq!(sink.count(MessageCode::ProcessTypeMismatch), 1);

    let agent = ModuleTracker::new(TrackerConfig::new("NodeAgent"));
    let handle = agent.adding_module(module(1, "test.AgentOnly test.Alpha"), None).unwrap();
    assert_eq!(handle.components().len(), 2);
}

#[test]
fn test_custom_components_header() {
    let tracker = ModuleTracker::new(TrackerConfig::new("ManagedProcess").with_components_header("X-Parts"));
    let custom: Arc<dyn Module> = Arc::new(
        StaticModule::new(ModuleId(3), "custom", scope())
            .with_header("X-Parts", "test.Beta")
            .with_components("test.Alpha"),
    );

    let handle = tracker.adding_module(custom, None).unwrap();
    assert_eq!(handle.components()[0].type_id(), "test.Beta");
    assert_eq!(handle.components().len(), 1);
}
