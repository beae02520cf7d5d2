//! Test modules for module tracking

mod concurrent;
mod tracker;
