//! Prompt-driven line sources: a raw-mode terminal editor and a buffered
//! fallback for pipes and files.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use crate::core::input::split_keys;
use crate::core::terminal::{Terminal, TerminalGuard};
use crate::widgets::line_editor::{EditOutcome, LineEditor};

/// What one prompt produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// The mode toggle key was pressed. Any partially typed text is kept for
    /// the next read.
    Toggle,
    Interrupted,
    Eof,
}

/// A source of user lines.
pub trait LineInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome>;
}

/// Line editing on a raw-mode terminal. Raw mode is held only while a read
/// is in progress, so child processes run on a cooked terminal.
pub struct TerminalLineInput<T: Terminal> {
    terminal: T,
    editor: LineEditor,
    pending_keys: VecDeque<String>,
}

impl<T: Terminal> TerminalLineInput<T> {
    pub fn new(terminal: T, editor: LineEditor) -> Self {
        Self {
            terminal,
            editor,
            pending_keys: VecDeque::new(),
        }
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    fn redraw(terminal: &mut T, editor: &LineEditor, prompt: &str) -> io::Result<()> {
        let columns = usize::from(terminal.columns());
        terminal.write(&editor.render(prompt, columns))
    }
}

impl<T: Terminal> LineInput for TerminalLineInput<T> {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        let mut guard = TerminalGuard::start(&mut self.terminal)?;
        let terminal = guard.terminal_mut();
        Self::redraw(terminal, &self.editor, prompt)?;

        loop {
            while let Some(key) = self.pending_keys.pop_front() {
                match self.editor.handle_key(&key) {
                    EditOutcome::Continue => continue,
                    EditOutcome::Submit(line) => {
                        terminal.write("\r\n")?;
                        return Ok(ReadOutcome::Line(line));
                    }
                    EditOutcome::Toggle => return Ok(ReadOutcome::Toggle),
                    EditOutcome::Interrupt => {
                        terminal.write("^C\r\n")?;
                        return Ok(ReadOutcome::Interrupted);
                    }
                    EditOutcome::Eof => {
                        terminal.write("\r\n")?;
                        return Ok(ReadOutcome::Eof);
                    }
                }
            }
            Self::redraw(terminal, &self.editor, prompt)?;

            match terminal.read_input()? {
                Some(chunk) => self.pending_keys.extend(split_keys(&chunk)),
                None => {
                    terminal.write("\r\n")?;
                    return Ok(ReadOutcome::Eof);
                }
            }
        }
    }
}

/// Reads whole lines from any buffered reader, echoing prompts to `output`.
/// There is no toggle key here; every line is returned as typed.
pub struct BufferedLineInput<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> BufferedLineInput<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> LineInput for BufferedLineInput<R, W> {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        self.output.write_all(prompt.as_bytes())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        Ok(ReadOutcome::Line(trimmed.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::{BufferedLineInput, LineInput, ReadOutcome};

    #[test]
    fn buffered_input_strips_line_endings_and_reports_eof() {
        let mut input = BufferedLineInput::new(Cursor::new("ls\r\nexit\n"), Vec::new());

        assert_eq!(
            input.read_line("> ").expect("read"),
            ReadOutcome::Line("ls".to_string())
        );
        assert_eq!(
            input.read_line("> ").expect("read"),
            ReadOutcome::Line("exit".to_string())
        );
        assert_eq!(input.read_line("> ").expect("read"), ReadOutcome::Eof);
        assert_eq!(input.into_output(), b"> > > ".to_vec());
    }
}
