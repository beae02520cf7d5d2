//! State table output

use crate::core::error_handling::error_chain;
use crate::core::styles::StyleRole;
use crate::module::api::ModuleHandle;
use prettytable::{format, Cell, Row, Table};

const NOT_CREATED: &str = "not created";

fn cell(text: &str, role: StyleRole, color: bool) -> Cell {
    let cell = Cell::new(text);
    match role.to_prettytable_spec() {
        Some(spec) if color => cell.style_spec(&spec),
        _ => cell,
    }
}

/// One row per component and one per type that could not be created
pub fn state_table(modules: &[ModuleHandle], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        ["Module", "Component", "Type", "State", "Problem"]
            .iter()
            .map(|title| cell(title, StyleRole::Header, color))
            .collect(),
    ));

    for managed in modules {
        let module = format!("{} {}", managed.id(), managed.module().symbolic_name());
        let errors = managed.errors();

        for manager in managed.components() {
            let state = manager.state();
            let problem = errors
                .iter()
                .filter(|error| error.component() == Some(manager.name()))
                .map(|error| error_chain(&**error))
                .collect::<Vec<_>>()
                .join("; ");
            table.add_row(Row::new(vec![
                Cell::new(&module),
                Cell::new(manager.name()),
                cell(manager.type_id(), StyleRole::Code, color),
                cell(&state.to_string(), StyleRole::for_state(state), color),
                cell(&problem, StyleRole::Stalled, color),
            ]));
        }

        for error in errors.iter().filter(|error| error.is_discovery_error()) {
            table.add_row(Row::new(vec![
                Cell::new(&module),
                Cell::new("-"),
                cell(error.type_id().unwrap_or("-"), StyleRole::Code, color),
                cell(NOT_CREATED, StyleRole::Stalled, color),
                cell(&error_chain(&**error), StyleRole::Stalled, color),
            ]));
        }
    }
    table
}

pub fn print_state_table(title: &str, modules: &[ModuleHandle], color: bool) {
    println!("{}", StyleRole::Header.paint(title, color));
    if modules.is_empty() {
        println!("  (no tracked modules)");
        return;
    }
    state_table(modules, color).printstd();
}
