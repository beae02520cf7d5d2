//! Test modules for the component system

pub(crate) mod utils;
