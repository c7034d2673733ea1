//! Reusable TUI components.

pub mod multi_select;
