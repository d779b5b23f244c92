//! Terminal line input for aish.
//!
//! # Public API Overview
//! - Read prompted lines through [`LineInput`]: [`TerminalLineInput`] edits in
//!   raw mode on a [`Terminal`], [`BufferedLineInput`] reads any `BufRead`.
//! - Parse and match raw key sequences with [`parse_key`] and [`split_keys`].
//! - Bind keys to editor actions with [`LineKeybindingsManager`]; the mode
//!   toggle key is configurable.
//! - Style output with [`Palette`] and measure it with [`visible_width`].

pub mod config;

pub mod core;
pub mod platform;
pub mod widgets;

pub use crate::config::EnvConfig;

/// Keybinding configuration and default mappings.
pub use crate::core::keybindings::{
    KeyBinding, KeyId, LineAction, LineKeybindingsConfig, LineKeybindingsManager,
    DEFAULT_LINE_KEYBINDINGS,
};

/// Keyboard input parsing and matching helpers.
pub use crate::core::input::{is_printable, matches_key, parse_key, split_keys};

/// ANSI styling.
pub use crate::core::style::Palette;

/// Terminal interfaces and process-backed implementation.
pub use crate::core::terminal::{Terminal, TerminalGuard};
#[cfg(unix)]
pub use crate::platform::{stdio_is_tty, ProcessTerminal};

/// Line editing widgets.
pub use crate::widgets::{
    BufferedLineInput, EditOutcome, LineEditor, LineInput, ReadOutcome, TerminalLineInput,
};

/// Visible width helpers that ignore ANSI control sequences.
pub use crate::core::text::ansi::strip_ansi;
pub use crate::core::text::width::visible_width;
