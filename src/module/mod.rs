//! Module Tracking
//!
//! Reacts to modules appearing and disappearing in the host, discovering the
//! components each one declares and driving them through their lifecycle as
//! a batch.

// Internal modules - all access should go through api module
pub(crate) mod config;
pub(crate) mod managed;
pub(crate) mod tracker;
pub(crate) mod types;

// Public API module - the only public interface for module tracking
pub mod api;

#[cfg(test)]
mod tests;
