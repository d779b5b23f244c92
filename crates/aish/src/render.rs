//! Console output for the session: assistant text, command streams, notices
//! and errors.

use std::io::{self, Write};

use aish_term::Palette;
use tracing::debug;

/// Where the session prints. Write failures (a closed pipe, say) are logged
/// and otherwise ignored so output problems never abort a turn.
pub struct Console {
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    palette: Palette,
}

impl Console {
    pub fn new(out: impl Write + 'static, err: impl Write + 'static, palette: Palette) -> Self {
        Self {
            out: Box::new(out),
            err: Box::new(err),
            palette,
        }
    }

    /// Process stdout/stderr.
    #[must_use]
    pub fn stdio(palette: Palette) -> Self {
        Self::new(io::stdout(), io::stderr(), palette)
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        self.palette
    }

    fn emit(stream: &mut dyn Write, text: &str) {
        let result = stream.write_all(text.as_bytes()).and_then(|()| stream.flush());
        if let Err(error) = result {
            debug!(%error, "console write failed");
        }
    }

    /// Writes `text` to stdout unchanged.
    pub fn raw(&mut self, text: &str) {
        Self::emit(self.out.as_mut(), text);
    }

    pub fn line(&mut self, text: &str) {
        Self::emit(self.out.as_mut(), &format!("{text}\n"));
    }

    /// Sanitized assistant reply.
    pub fn assistant(&mut self, text: &str) {
        self.line(text);
    }

    /// Captured child stdout, newline-terminated.
    pub fn command_stdout(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let newline = if text.ends_with('\n') { "" } else { "\n" };
        Self::emit(self.out.as_mut(), &format!("{text}{newline}"));
    }

    /// Captured child stderr, newline-terminated.
    pub fn command_stderr(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let newline = if text.ends_with('\n') { "" } else { "\n" };
        Self::emit(self.err.as_mut(), &format!("{text}{newline}"));
    }

    pub fn notice(&mut self, text: &str) {
        let styled = self.palette.dim(text);
        self.line(&styled);
    }

    /// `Error: <detail>` in red on stdout.
    pub fn error(&mut self, detail: &str) {
        let styled = self.palette.red(&format!("Error: {detail}"));
        self.line(&styled);
    }
}
