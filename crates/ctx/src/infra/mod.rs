//! Infrastructure adapters for configuration and filesystem conventions.

pub mod config;
pub mod workspace;
