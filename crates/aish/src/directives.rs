//! Directive markers inside assistant responses.
//!
//! `<execute>COMMAND</execute>` asks for a shell command, `<think>..</think>`
//! is private reasoning, `<end>` closes the exchange and `<user>` asks for
//! more input. Matching is non-greedy, spans newlines and does not nest.

use once_cell::sync::Lazy;
use regex::Regex;

pub const END_MARKER: &str = "<end>";
pub const USER_MARKER: &str = "<user>";

static EXECUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<execute>(.*?)</execute>").expect("execute regex must compile"));

static THINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("think regex must compile"));

/// Commands in first-to-last order, passed through verbatim.
/// An unterminated `<execute>` yields nothing.
#[must_use]
pub fn extract(response: &str) -> Vec<String> {
    EXECUTE_RE
        .captures_iter(response)
        .filter_map(|captures| captures.get(1))
        .map(|command| command.as_str().to_string())
        .collect()
}

/// Display text: drops execute spans, think spans, `<end>` and `<user>`,
/// then trims.
///
/// Removing one marker can join its neighbours into a new one
/// (`<en<end>d>`), so passes repeat until the text stops changing.
#[must_use]
pub fn sanitize(response: &str) -> String {
    let mut current = strip_markers(response);
    loop {
        let next = strip_markers(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_markers(text: &str) -> String {
    let without_execute = EXECUTE_RE.replace_all(text, "");
    let without_think = THINK_RE.replace_all(&without_execute, "");
    without_think
        .replace(END_MARKER, "")
        .replace(USER_MARKER, "")
        .trim()
        .to_string()
}

#[must_use]
pub fn has_end_marker(response: &str) -> bool {
    response.contains(END_MARKER)
}

#[must_use]
pub fn has_user_marker(response: &str) -> bool {
    response.contains(USER_MARKER)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{extract, has_end_marker, has_user_marker, sanitize};

    #[test]
    fn extract_returns_commands_in_order() {
        let response = "First <execute>ls -la</execute> then <execute>pwd</execute>.";
        assert_eq!(extract(response), vec!["ls -la", "pwd"]);
    }

    #[test]
    fn extract_spans_newlines_and_keeps_text_verbatim() {
        let response = "<execute>\nfor f in *; do\n  echo $f\ndone\n</execute>";
        assert_eq!(extract(response), vec!["\nfor f in *; do\n  echo $f\ndone\n"]);
    }

    #[test]
    fn unterminated_directive_is_not_extracted() {
        assert!(extract("Try <execute>rm -rf /tmp/x").is_empty());
        assert_eq!(sanitize("Try <execute>ls"), "Try <execute>ls");
    }

    #[test]
    fn sanitize_strips_every_marker() {
        let response =
            "<think>plan it</think>Listing now. <execute>ls</execute>\n<execute>pwd</execute><user><end>  ";
        assert_eq!(sanitize(response), "Listing now.");
    }

    #[test]
    fn sanitize_is_trim_identity_without_markers() {
        let text = "  plain answer\nwith two lines \n";
        assert_eq!(sanitize(text), text.trim());
    }

    #[test]
    fn sanitize_is_idempotent() {
        let inputs = [
            "Done <execute>echo hi</execute><end>",
            "<think>a</think> b <user>",
            "<exec<execute>x</execute>ute>y</execute>",
            "<en<end>d> tail",
            "nothing here",
        ];
        for input in inputs {
            let once = sanitize(input);
            assert_eq!(sanitize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn markers_are_detected_as_substrings() {
        assert!(has_end_marker("ok<end>"));
        assert!(!has_end_marker("ok <en d>"));
        assert!(has_user_marker("what next? <user>"));
    }
}
