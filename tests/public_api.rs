#![allow(unused_imports)]

use aish_term::{
    is_printable, matches_key, parse_key, split_keys, strip_ansi, visible_width,
    BufferedLineInput, EditOutcome, EnvConfig, KeyBinding, KeyId, LineAction, LineEditor,
    LineInput, LineKeybindingsConfig, LineKeybindingsManager, Palette, ReadOutcome, Terminal,
    TerminalGuard, TerminalLineInput, DEFAULT_LINE_KEYBINDINGS,
};

#[cfg(unix)]
use aish_term::{stdio_is_tty, ProcessTerminal};

#[test]
fn public_api_exports_compile() {}
