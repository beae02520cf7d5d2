//! Component System Module
//!
//! Type registry, discovery and the per-component lifecycle state machine.
//! Components are declared by modules, created through registered factories
//! and driven through initialize/start/stop/destroy with failures isolated
//! per component.

// Internal modules - all access should go through api module
pub(crate) mod diagnostics;
pub(crate) mod discovery;
pub(crate) mod error;
pub(crate) mod lifecycle;
pub(crate) mod registry;
pub(crate) mod services;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for the component system
pub mod api;

#[cfg(test)]
pub(crate) mod tests;
