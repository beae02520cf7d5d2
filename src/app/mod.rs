//! Host simulator application

pub mod cli;
pub mod demo;
pub mod display;
pub mod host;
pub mod startup;
