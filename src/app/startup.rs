//! Application startup
//!
//! Parses arguments, starts logging, loads the host configuration and then
//! replays module events through a [`ModuleTracker`].

use crate::app::cli::api::{Args, HostConfig};
use crate::app::display::print_state_table;
use crate::app::host::ModuleHost;
use crate::component::api::{InMemoryServiceRegistry, ServiceRegistry, TypeRegistry};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::version::long_version;
use crate::module::api::{Module, ModuleEvent, ModuleTracker};
use clap::Parser;
use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

/// Run the host simulator with the process arguments
pub fn run() -> ExitCode {
    run_with(Args::parse())
}

pub fn run_with(args: Args) -> ExitCode {
    let use_color = args.use_color(std::io::stdout().is_terminal());
    colored::control::set_override(use_color);

    if let Err(e) = init_logging(
        args.log_level.as_deref(),
        args.log_format.as_deref(),
        args.log_file(),
        use_color,
    ) {
        eprintln!("Error: failed to start logging: {e}");
        return ExitCode::FAILURE;
    }
    log::info!("modlife {} starting", long_version());

    let mut config = match HostConfig::resolve(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log_error_with_context(&e, "Loading host configuration");
            return ExitCode::FAILURE;
        }
    };
    if let Some(process_type) = args.process_type {
        config.tracker.process_type = process_type;
    }
    if let Err(e) = config.validate() {
        log_error_with_context(&e, "Validating host configuration");
        return ExitCode::FAILURE;
    }

    let services = Arc::new(InMemoryServiceRegistry::new());
    let tracker = Arc::new(
        ModuleTracker::new(config.tracker.clone())
            .with_service_registry(Arc::clone(&services) as Arc<dyn ServiceRegistry>),
    );
    let scope = Arc::new(TypeRegistry::from_inventory());
    log::info!(
        "Tracking modules as process type '{}' with {} known component types",
        tracker.process_type(),
        scope.len()
    );

    let mut host = ModuleHost::new(Arc::clone(&tracker));
    for module_config in &config.modules {
        let module: Arc<dyn Module> = Arc::new(
            module_config.to_module(Arc::clone(&scope), &config.tracker.components_header),
        );
        host.install(module, Some(ModuleEvent::Started));
    }

    let snapshot = tracker.managed_modules();
    print_state_table("Loaded", &snapshot, use_color);
    println!("Published services: {}", services.len());

    if args.keep_loaded {
        log::info!("Leaving {} modules loaded", host.len());
        return ExitCode::SUCCESS;
    }

    host.uninstall_all();
    print_state_table("Unloaded", &snapshot, use_color);
    println!("Published services: {}", services.len());
    ExitCode::SUCCESS
}
