//! Text helpers for prompt rendering: ANSI scanning and display width.

pub mod ansi;
pub mod width;
