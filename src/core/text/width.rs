//! Grapheme width and visible width helpers.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::ansi::strip_ansi;

const TAB_WIDTH: usize = 3;

pub fn grapheme_width(grapheme: &str) -> usize {
    if grapheme == "\t" {
        return TAB_WIDTH;
    }
    UnicodeWidthStr::width(grapheme)
}

/// Terminal columns occupied by `input`, ignoring escape sequences.
pub fn visible_width(input: &str) -> usize {
    strip_ansi(input).graphemes(true).map(grapheme_width).sum()
}

/// Longest prefix of `input` (plain text) fitting in `max_width` columns.
pub fn take_width(input: &str, max_width: usize) -> &str {
    let mut width = 0;
    for (idx, grapheme) in input.grapheme_indices(true) {
        width += grapheme_width(grapheme);
        if width > max_width {
            return &input[..idx];
        }
    }
    input
}
