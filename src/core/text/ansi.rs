//! ANSI escape scanning.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
    Ss3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiCode {
    pub code: String,
    pub length: usize,
    pub kind: AnsiCodeKind,
}

/// Recognises the escape sequence starting at byte `pos`, if any.
pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => extract_csi(input, pos),
        b']' => extract_osc(input, pos),
        b'O' if pos + 2 < bytes.len() => Some(code_at(input, pos, pos + 3, AnsiCodeKind::Ss3)),
        _ => None,
    }
}

fn code_at(input: &str, pos: usize, end: usize, kind: AnsiCodeKind) -> AnsiCode {
    AnsiCode {
        code: input[pos..end].to_string(),
        length: end - pos,
        kind,
    }
}

fn extract_csi(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    (pos + 2..bytes.len())
        .find(|idx| (0x40..=0x7e).contains(&bytes[*idx]))
        .map(|idx| code_at(input, pos, idx + 1, AnsiCodeKind::Csi))
}

// OSC ends at BEL or ST (ESC \).
fn extract_osc(input: &str, pos: usize) -> Option<AnsiCode> {
    let bytes = input.as_bytes();
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(code_at(input, pos, idx + 1, AnsiCodeKind::Osc));
        }
        if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
            return Some(code_at(input, pos, idx + 2, AnsiCodeKind::Osc));
        }
        idx += 1;
    }
    None
}

/// Removes every recognised escape sequence from `input`.
pub fn strip_ansi(input: &str) -> String {
    let mut clean = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(ansi) = extract_ansi_code(input, idx) {
            idx += ansi.length;
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        clean.push(ch);
        idx += ch.len_utf8();
    }
    clean
}
