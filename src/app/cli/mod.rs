//! Command line interface and host configuration

pub mod api;
pub mod args;
pub mod config;
