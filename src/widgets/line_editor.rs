//! Single-line editor with history and horizontal scrolling.

use std::iter::Peekable;

use unicode_segmentation::{Graphemes, UnicodeSegmentation};

use crate::core::input::is_printable;
use crate::core::keybindings::{LineAction, LineKeybindingsManager};
use crate::core::text::width::{take_width, visible_width};

/// Result of feeding one key sequence to the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Continue,
    Submit(String),
    /// Mode toggle requested; the buffer is kept.
    Toggle,
    /// Interrupt key; the buffer is discarded.
    Interrupt,
    /// End of input on an empty line.
    Eof,
}

pub struct LineEditor {
    value: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
    draft: String,
    keybindings: LineKeybindingsManager,
}

impl Default for LineEditor {
    fn default() -> Self {
        Self::new(LineKeybindingsManager::default())
    }
}

fn is_whitespace_segment(segment: &str) -> bool {
    segment.chars().any(char::is_whitespace)
}

fn is_punctuation_segment(segment: &str) -> bool {
    segment.chars().any(|ch| ch.is_ascii_punctuation())
}

fn is_word_segment(segment: &str) -> bool {
    !is_whitespace_segment(segment) && !is_punctuation_segment(segment)
}

impl LineEditor {
    pub fn new(keybindings: LineKeybindingsManager) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            history: Vec::new(),
            history_index: None,
            draft: String::new(),
            keybindings,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position as a byte offset into [`Self::value`].
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn handle_key(&mut self, data: &str) -> EditOutcome {
        let Some(action) = self.keybindings.action_for(data) else {
            if is_printable(data) {
                self.insert_text(data);
            }
            return EditOutcome::Continue;
        };

        match action {
            LineAction::ToggleMode => return EditOutcome::Toggle,
            LineAction::Submit => return EditOutcome::Submit(self.take_line()),
            LineAction::Interrupt => {
                self.reset();
                return EditOutcome::Interrupt;
            }
            LineAction::EndOfInput if self.value.is_empty() => return EditOutcome::Eof,
            LineAction::EndOfInput | LineAction::DeleteCharForward => self.delete_char_forward(),
            LineAction::DeleteCharBackward => self.delete_char_backward(),
            LineAction::DeleteWordBackward => self.delete_word_backwards(),
            LineAction::DeleteToLineStart => {
                self.value.replace_range(..self.cursor, "");
                self.cursor = 0;
            }
            LineAction::DeleteToLineEnd => self.value.truncate(self.cursor),
            LineAction::CursorLeft => self.cursor = self.prev_boundary(),
            LineAction::CursorRight => self.cursor = self.next_boundary(),
            LineAction::CursorWordLeft => self.move_word_backwards(),
            LineAction::CursorWordRight => self.move_word_forwards(),
            LineAction::CursorLineStart => self.cursor = 0,
            LineAction::CursorLineEnd => self.cursor = self.value.len(),
            LineAction::HistoryPrev => self.history_prev(),
            LineAction::HistoryNext => self.history_next(),
        }
        EditOutcome::Continue
    }

    /// Redraws the current line: clears it, writes `prompt` and the visible
    /// slice of the buffer, then places the cursor.
    pub fn render(&self, prompt: &str, columns: usize) -> String {
        let prompt_width = visible_width(prompt);
        let available = columns.saturating_sub(prompt_width + 1).max(1);

        let (start, shown) = if visible_width(&self.value) <= available {
            (0, self.value.as_str())
        } else {
            let start = self.scroll_start(available);
            (start, take_width(&self.value[start..], available))
        };
        let cursor_column = prompt_width + visible_width(&self.value[start..self.cursor]);

        let mut out = String::with_capacity(prompt.len() + shown.len() + 16);
        out.push_str("\r\x1b[2K");
        out.push_str(prompt);
        out.push_str(shown);
        out.push('\r');
        if cursor_column > 0 {
            out.push_str(&format!("\x1b[{cursor_column}C"));
        }
        out
    }

    // First byte shown so that the text up to the cursor fits in `available`.
    fn scroll_start(&self, available: usize) -> usize {
        let before = &self.value[..self.cursor];
        let mut start = 0;
        let mut width = visible_width(before);
        for (idx, grapheme) in before.grapheme_indices(true) {
            if width <= available {
                break;
            }
            width -= visible_width(grapheme);
            start = idx + grapheme.len();
        }
        start
    }

    fn take_line(&mut self) -> String {
        let line = std::mem::take(&mut self.value);
        self.cursor = 0;
        self.history_index = None;
        self.draft.clear();
        if !line.trim().is_empty() && self.history.last() != Some(&line) {
            self.history.push(line.clone());
        }
        line
    }

    fn reset(&mut self) {
        self.value.clear();
        self.cursor = 0;
        self.history_index = None;
        self.draft.clear();
    }

    fn insert_text(&mut self, text: &str) {
        let cleaned = text.replace(['\r', '\n'], "");
        if cleaned.is_empty() {
            return;
        }
        self.value.insert_str(self.cursor, &cleaned);
        self.cursor += cleaned.len();
    }

    fn prev_boundary(&self) -> usize {
        self.value[..self.cursor]
            .grapheme_indices(true)
            .next_back()
            .map_or(0, |(idx, _)| idx)
    }

    fn next_boundary(&self) -> usize {
        self.value[self.cursor..]
            .graphemes(true)
            .next()
            .map_or(self.cursor, |grapheme| self.cursor + grapheme.len())
    }

    fn delete_char_backward(&mut self) {
        let start = self.prev_boundary();
        self.value.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    fn delete_char_forward(&mut self) {
        let end = self.next_boundary();
        self.value.replace_range(self.cursor..end, "");
    }

    fn delete_word_backwards(&mut self) {
        let end = self.cursor;
        self.move_word_backwards();
        self.value.replace_range(self.cursor..end, "");
    }

    fn move_word_backwards(&mut self) {
        let mut graphemes: Vec<&str> = self.value[..self.cursor].graphemes(true).collect();
        let mut cursor = self.cursor;
        let mut skip_while = |graphemes: &mut Vec<&str>, pred: fn(&str) -> bool| {
            while let Some(last) = graphemes.last().copied().filter(|last| pred(last)) {
                cursor -= last.len();
                graphemes.pop();
            }
        };

        skip_while(&mut graphemes, is_whitespace_segment);
        if graphemes.last().is_some_and(|last| is_punctuation_segment(last)) {
            skip_while(&mut graphemes, is_punctuation_segment);
        } else {
            skip_while(&mut graphemes, is_word_segment);
        }
        self.cursor = cursor;
    }

    fn move_word_forwards(&mut self) {
        let mut graphemes = self.value[self.cursor..].graphemes(true).peekable();
        let mut cursor = self.cursor;
        let mut skip_while = |graphemes: &mut Peekable<Graphemes<'_>>, pred: fn(&str) -> bool| {
            while let Some(next) = graphemes.next_if(|next: &&str| pred(next)) {
                cursor += next.len();
            }
        };

        skip_while(&mut graphemes, is_whitespace_segment);
        if graphemes.peek().is_some_and(|next| is_punctuation_segment(next)) {
            skip_while(&mut graphemes, is_punctuation_segment);
        } else {
            skip_while(&mut graphemes, is_word_segment);
        }
        self.cursor = cursor;
    }

    fn history_prev(&mut self) {
        let index = match self.history_index {
            None if self.history.is_empty() => return,
            None => {
                self.draft = self.value.clone();
                self.history.len() - 1
            }
            Some(0) => return,
            Some(index) => index - 1,
        };
        self.history_index = Some(index);
        self.set_value(self.history[index].clone());
    }

    fn history_next(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.set_value(self.history[index + 1].clone());
        } else {
            self.history_index = None;
            let draft = std::mem::take(&mut self.draft);
            self.set_value(draft);
        }
    }
}
