//! Core domain types shared by the composition pipeline.

pub mod errors;
pub mod model;
