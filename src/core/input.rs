//! Key identification for legacy (non-kitty) terminal input.
//!
//! Raw-mode input arrives as byte chunks; [`split_keys`] cuts a chunk into
//! individual key sequences and [`parse_key`] names each one (`"enter"`,
//! `"ctrl+space"`, `"alt+b"`, `"a"`).

const ESC: char = '\x1b';

const LEGACY_UP: [&str; 2] = ["\x1b[A", "\x1bOA"];
const LEGACY_DOWN: [&str; 2] = ["\x1b[B", "\x1bOB"];
const LEGACY_RIGHT: [&str; 2] = ["\x1b[C", "\x1bOC"];
const LEGACY_LEFT: [&str; 2] = ["\x1b[D", "\x1bOD"];
const LEGACY_HOME: [&str; 4] = ["\x1b[H", "\x1bOH", "\x1b[1~", "\x1b[7~"];
const LEGACY_END: [&str; 4] = ["\x1b[F", "\x1bOF", "\x1b[4~", "\x1b[8~"];
const LEGACY_DELETE: [&str; 1] = ["\x1b[3~"];
const LEGACY_CTRL_LEFT: [&str; 2] = ["\x1b[1;5D", "\x1bOd"];
const LEGACY_CTRL_RIGHT: [&str; 2] = ["\x1b[1;5C", "\x1bOc"];
const LEGACY_ALT_LEFT: [&str; 1] = ["\x1b[1;3D"];
const LEGACY_ALT_RIGHT: [&str; 1] = ["\x1b[1;3C"];

fn legacy_sequence_key_id(data: &str) -> Option<&'static str> {
    let table: [(&[&str], &'static str); 11] = [
        (&LEGACY_UP, "up"),
        (&LEGACY_DOWN, "down"),
        (&LEGACY_RIGHT, "right"),
        (&LEGACY_LEFT, "left"),
        (&LEGACY_HOME, "home"),
        (&LEGACY_END, "end"),
        (&LEGACY_DELETE, "delete"),
        (&LEGACY_CTRL_LEFT, "ctrl+left"),
        (&LEGACY_CTRL_RIGHT, "ctrl+right"),
        (&LEGACY_ALT_LEFT, "alt+left"),
        (&LEGACY_ALT_RIGHT, "alt+right"),
    ];
    table
        .iter()
        .find(|(sequences, _)| sequences.contains(&data))
        .map(|(_, key_id)| *key_id)
}

/// Names a single key sequence, or `None` for unrecognised input.
pub fn parse_key(data: &str) -> Option<String> {
    if let Some(key_id) = legacy_sequence_key_id(data) {
        return Some(key_id.to_string());
    }

    match data {
        "\x1b" => return Some("escape".to_string()),
        "\x00" => return Some("ctrl+space".to_string()),
        "\t" => return Some("tab".to_string()),
        "\r" | "\n" | "\x1bOM" => return Some("enter".to_string()),
        " " => return Some("space".to_string()),
        "\x7f" | "\x08" => return Some("backspace".to_string()),
        "\x1b\x7f" | "\x1b\x08" => return Some("alt+backspace".to_string()),
        "\x1b[Z" => return Some("shift+tab".to_string()),
        "\x1f" => return Some("ctrl+-".to_string()),
        "\x1bb" | "\x1bB" => return Some("alt+b".to_string()),
        "\x1bf" | "\x1bF" => return Some("alt+f".to_string()),
        "\x1bd" => return Some("alt+d".to_string()),
        _ => {}
    }

    if data.len() == 1 {
        let code = data.as_bytes()[0];
        if (1..=26).contains(&code) {
            let ch = (code + 96) as char;
            return Some(format!("ctrl+{ch}"));
        }
        if (32..=126).contains(&code) {
            return Some(data.to_string());
        }
    }

    None
}

/// True when `data` is the key named by `key_id`.
pub fn matches_key(data: &str, key_id: &str) -> bool {
    parse_key(data).is_some_and(|parsed| parsed.eq_ignore_ascii_case(key_id))
}

/// True when `data` is text to insert rather than a control sequence.
pub fn is_printable(data: &str) -> bool {
    !data.is_empty() && !data.chars().any(char::is_control)
}

/// Splits a raw input chunk into key sequences.
///
/// Escape sequences (`ESC [ ... final`, `ESC O x`, `ESC x`) stay whole. Every
/// other character becomes its own item, so pasted text yields one item per
/// character.
pub fn split_keys(chunk: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut chars = chunk.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        if ch != ESC {
            keys.push(ch.to_string());
            continue;
        }

        let mut end = start + ch.len_utf8();
        match chars.peek().copied() {
            Some((_, '[')) => {
                chars.next();
                end += 1;
                // CSI: parameters and intermediates until a final byte in @..~
                while let Some((index, next)) = chars.next() {
                    end = index + next.len_utf8();
                    if ('@'..='~').contains(&next) && next != '[' {
                        break;
                    }
                }
            }
            Some((_, 'O')) => {
                chars.next();
                end += 1;
                if let Some((index, next)) = chars.next() {
                    end = index + next.len_utf8();
                }
            }
            Some((index, next)) if next != ESC => {
                chars.next();
                end = index + next.len_utf8();
            }
            _ => {}
        }
        keys.push(chunk[start..end].to_string());
    }

    keys
}
