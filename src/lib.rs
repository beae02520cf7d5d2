pub mod app;
pub mod component;
pub mod core;
pub mod module;

#[doc(hidden)]
pub use inventory;
