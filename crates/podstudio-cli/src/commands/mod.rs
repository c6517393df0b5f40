//! CLI command implementations.

pub mod chain;
pub mod common;
pub mod devices;
pub mod effects;
pub mod play;
