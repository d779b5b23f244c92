//! Core interfaces and types.

pub mod input;
pub mod keybindings;
pub mod style;
pub mod terminal;
pub mod text;
