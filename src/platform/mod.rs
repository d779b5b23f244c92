//! Platform-specific terminal integrations.

pub mod process_terminal;

#[cfg(unix)]
pub use process_terminal::{stdio_is_tty, ProcessTerminal};
