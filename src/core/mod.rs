//! Core infrastructure shared by the component and module subsystems

pub mod error_handling;
pub mod logging;
pub mod panic;
pub mod styles;
pub mod sync;
pub mod version;
