//! Tracked collection under concurrent module events

use crate::component::api::{MessageCode, ModuleId, RecordingSink, State};
use crate::component::tests::utils::abc_registry;
use crate::module::api::{Module, ModuleListener, ModuleTracker, StaticModule, TrackerConfig};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: u64 = 8;
const MODULES_PER_THREAD: u64 = 25;

#[test]
fn test_concurrent_add_and_remove() {
    let tracker = Arc::new(ModuleTracker::new(TrackerConfig::new("ManagedProcess")));
    let scope = Arc::new(abc_registry());
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let workers: Vec<_> = (0..THREADS)
        .map(|worker| {
            let tracker = Arc::clone(&tracker);
            let scope = Arc::clone(&scope);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for n in 0..MODULES_PER_THREAD {
                    let id = worker * 1000 + n;
                    let module: Arc<dyn Module> = Arc::new(
                        StaticModule::new(ModuleId(id), format!("m{id}"), Arc::clone(&scope))
                            .with_components("test.Alpha test.Beta"),
                    );
                    let handle = tracker.adding_module(Arc::clone(&module), None);
                    assert!(handle.is_some());
                    assert!(tracker.is_managed(module.as_ref()));
                    // Keep every other module loaded
                    if n % 2 == 0 {
                        tracker.removed_module(&module, None, handle);
                        assert!(!tracker.is_managed(module.as_ref()));
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    let remaining = tracker.managed_modules();
    assert_eq!(remaining.len() as u64, THREADS * (MODULES_PER_THREAD / 2));
    assert!(remaining
        .iter()
        .flat_map(|managed| managed.components())
        .all(|manager| manager.state() == State::Started));
}

#[test]
fn test_racing_duplicate_adds_track_one_module() {
    let tracker = Arc::new(ModuleTracker::new(TrackerConfig::new("ManagedProcess")));
    let module: Arc<dyn Module> = Arc::new(
        StaticModule::new(ModuleId(42), "shared", Arc::new(abc_registry())).with_components("test.Alpha"),
    );
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let module = Arc::clone(&module);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                tracker.adding_module(module, None).is_some()
            })
        })
        .collect();
    let accepted = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .filter(|accepted| *accepted)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(tracker.len(), 1);
}

#[test]
fn test_racing_duplicate_adds_report_discovery_failures_once() {
    let sink = Arc::new(RecordingSink::new());
    let tracker = Arc::new(
        ModuleTracker::new(TrackerConfig::new("ManagedProcess")).with_diagnostics(sink.clone()),
    );
    let module: Arc<dyn Module> = Arc::new(
        StaticModule::new(ModuleId(43), "shared.partial", Arc::new(abc_registry()))
            .with_components("test.Alpha test.Missing"),
    );
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let workers: Vec<_> = (0..THREADS)
        .map(|_| {
            let tracker = Arc::clone(&tracker);
            let module = Arc::clone(&module);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                tracker.adding_module(module, None).is_some()
            })
        })
        .collect();
    let accepted = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .filter(|accepted| *accepted)
        .count();

    assert_eq!(accepted, 1);
    assert_eq!(sink.count(MessageCode::ResolutionFailed), 1);
    assert_eq!(sink.count(MessageCode::DuplicateModule), THREADS as usize - 1);
    let managed = tracker.find(ModuleId(43)).unwrap();
    assert_eq!(managed.errors().len(), 1);
}
