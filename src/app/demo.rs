//! Built-in demo component types
//!
//! Registered at link time so every module loaded by the host simulator can
//! declare them:
//!
//! | type id              | behaviour                                         |
//! |----------------------|---------------------------------------------------|
//! | `demo.heartbeat`     | background thread ticking every `interval_ms`     |
//! | `demo.echo`          | published as `demo.Echo`, greets with `greeting`  |
//! | `demo.faulty_start`  | acquires a resource, then fails to start          |

use crate::component::api::{BoxError, Component, ComponentConfig, StopActions};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 250;

/// Ticks on a background thread until stopped
#[derive(Debug)]
pub struct HeartbeatComponent {
    interval_ms: AtomicU64,
    beats: Arc<AtomicU64>,
}

impl Default for HeartbeatComponent {
    fn default() -> Self {
        Self {
            interval_ms: AtomicU64::new(DEFAULT_HEARTBEAT_INTERVAL_MS),
            beats: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl HeartbeatComponent {
    pub fn beats(&self) -> u64 {
        self.beats.load(Ordering::Relaxed)
    }
}

impl Component for HeartbeatComponent {
    fn do_initialize(&self, config: &ComponentConfig) -> Result<(), BoxError> {
        if let Some(interval) = config.get_integer("interval_ms") {
            let interval = u64::try_from(interval)
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or_else(|| format!("interval_ms must be positive, got {interval}"))?;
            self.interval_ms.store(interval, Ordering::Relaxed);
        }
        Ok(())
    }

    fn do_start(&self, stop_actions: &StopActions) -> Result<(), BoxError> {
        let interval = Duration::from_millis(self.interval_ms.load(Ordering::Relaxed));
        let running = Arc::new(AtomicBool::new(true));
        let beats = Arc::clone(&self.beats);

        let worker = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("heartbeat".to_string())
                .spawn(move || {
                    while running.load(Ordering::Acquire) {
                        let n = beats.fetch_add(1, Ordering::Relaxed) + 1;
                        log::trace!("heartbeat {}", n);
                        thread::park_timeout(interval);
                    }
                })?
        };

        stop_actions.add(move || {
            running.store(false, Ordering::Release);
            worker.thread().unpark();
            if worker.join().is_err() {
                log::warn!("heartbeat thread panicked");
            }
        })?;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Answers with a configurable greeting; looked up through the service registry
#[derive(Debug, Default)]
pub struct EchoComponent {
    greeting: RwLock<String>,
    served: AtomicU64,
}

impl EchoComponent {
    pub fn echo(&self, message: &str) -> String {
        self.served.fetch_add(1, Ordering::Relaxed);
        let greeting = self.greeting.read().map(|g| g.clone()).unwrap_or_default();
        format!("{greeting}: {message}")
    }

    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }
}

impl Component for EchoComponent {
    fn do_initialize(&self, config: &ComponentConfig) -> Result<(), BoxError> {
        let greeting = config.get_str("greeting").unwrap_or("echo").to_string();
        *self.greeting.write().map_err(|_| "greeting lock poisoned")? = greeting;
        Ok(())
    }

    fn do_destroy(&self) {
        log::debug!("echo served {} requests", self.served());
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// Always fails in `do_start`, after registering cleanup for what it acquired
#[derive(Debug, Default)]
pub struct FaultyStartComponent {
    released: Arc<Mutex<bool>>,
}

impl FaultyStartComponent {
    pub fn released(&self) -> bool {
        self.released.lock().map(|r| *r).unwrap_or(false)
    }
}

impl Component for FaultyStartComponent {
    fn do_start(&self, stop_actions: &StopActions) -> Result<(), BoxError> {
        let released = Arc::clone(&self.released);
        stop_actions.add(move || {
            if let Ok(mut released) = released.lock() {
                *released = true;
            }
        })?;
        Err("demo listener could not bind its port".into())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

crate::component_type!(HeartbeatComponent => "demo.heartbeat");
crate::component_type!(EchoComponent => "demo.echo", services = ["demo.Echo"]);
crate::component_type!(FaultyStartComponent => "demo.faulty_start",
    process_types = ["ManagedProcess", "NodeAgent"]);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::api::{LifecycleManager, ModuleId, State, TypeRegistry};

    fn manager(component: Arc<dyn Component>) -> LifecycleManager {
        LifecycleManager::new("demo", ModuleId(1), component, vec![])
    }

    #[test]
    fn test_demo_types_are_registered_at_link_time() {
        let registry = TypeRegistry::from_inventory();
        for type_id in ["demo.heartbeat", "demo.echo", "demo.faulty_start"] {
            assert!(registry.contains(type_id), "{type_id} not registered");
        }
        let echo = registry.resolve("demo.echo").unwrap();
        assert_eq!(echo.service_contracts(), vec!["demo.Echo".to_string()]);
        assert!(!registry.resolve("demo.faulty_start").unwrap().applies_to("DeploymentManager"));
    }

    #[test]
    fn test_heartbeat_stops_its_thread() {
        let heartbeat = Arc::new(HeartbeatComponent::default());
        let manager = manager(heartbeat.clone());
        let mut settings = toml::Table::new();
        settings.insert("interval_ms".to_string(), toml::Value::Integer(1));
        manager.initialize(&ComponentConfig::new(settings)).unwrap();
        manager.start().unwrap();

        while heartbeat.beats() < 3 {
            thread::sleep(Duration::from_millis(1));
        }
        manager.stop().unwrap();
        let after_stop = heartbeat.beats();
        thread::sleep(Duration::from_millis(20));
        assert_eq!(heartbeat.beats(), after_stop);
    }

    #[test]
    fn test_heartbeat_rejects_negative_interval() {
        let manager = manager(Arc::new(HeartbeatComponent::default()));
        let mut settings = toml::Table::new();
        settings.insert("interval_ms".to_string(), toml::Value::Integer(-5));
        assert!(manager.initialize(&ComponentConfig::new(settings)).is_err());
        assert_eq!(manager.state(), State::Initializing);
    }

    #[test]
    fn test_echo_uses_configured_greeting() {
        let echo = EchoComponent::default();
        let mut settings = toml::Table::new();
        settings.insert("greeting".to_string(), toml::Value::String("hi".to_string()));
        echo.do_initialize(&ComponentConfig::new(settings)).unwrap();
        assert_eq!(echo.echo("there"), "hi: there");
        assert_eq!(echo.served(), 1);
    }

    #[test]
    fn test_faulty_start_releases_on_stop() {
        let faulty = Arc::new(FaultyStartComponent::default());
        let manager = manager(faulty.clone());
        manager.initialize(&ComponentConfig::default()).unwrap();
        assert!(manager.start().is_err());
        assert!(!faulty.released());

        manager.stop().unwrap();
        assert!(faulty.released());
    }
}
