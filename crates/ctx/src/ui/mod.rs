pub mod components;
pub mod prompt;
pub mod terminal;
