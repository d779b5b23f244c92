//! The interactive read loop and its terminal/prompt mode switch.

use std::io;

use aish_term::{Palette, ReadOutcome};
use chrono::Local;
use thiserror::Error;
use tracing::{info, warn};

use crate::conversation::{Conversation, MODE_NOTICE_PREFIX};
use crate::executor::ExecError;
use crate::process::InterruptShield;
use crate::session::{RunSummary, SessionContext, SessionError, SessionIo};

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("failed to read input: {0}")]
    Input(#[from] io::Error),
}

/// Where a submitted line goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Lines run directly in the shell.
    Terminal,
    /// Lines go to the agent.
    Prompt,
}

impl Mode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Terminal => Self::Prompt,
            Self::Prompt => Self::Terminal,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Prompt => "prompt",
        }
    }
}

/// `HH:MM:SS user@target ? `, colored per mode.
#[must_use]
pub fn prompt_text(palette: Palette, mode: Mode, time: &str, user: &str, target: &str) -> String {
    let target = match mode {
        Mode::Prompt => palette.yellow(target),
        Mode::Terminal => palette.green(target),
    };
    format!(
        "{} {}{}{}{}",
        palette.red(time),
        palette.blue(user),
        palette.magenta("@"),
        target,
        palette.magenta(" ? ")
    )
}

fn is_exit_command(line: &str) -> bool {
    line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit")
}

fn current_dir_label() -> String {
    std::env::current_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|_| ".".to_string())
}

/// Owns the transcript and the active mode for one interactive session.
pub struct Controller<'s> {
    session: &'s SessionContext,
    conversation: Conversation,
    mode: Mode,
    toggle_key: String,
    user: String,
    shield: Option<InterruptShield>,
}

impl<'s> Controller<'s> {
    pub fn new(session: &'s SessionContext, toggle_key: impl Into<String>) -> Self {
        let user = std::env::var("USER")
            .ok()
            .filter(|user| !user.trim().is_empty())
            .unwrap_or_else(|| "user".to_string());
        Self {
            session,
            conversation: Conversation::new(),
            mode: Mode::Terminal,
            toggle_key: toggle_key.into(),
            user,
            shield: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// SIGINT is absorbed while a line is handled, so an interrupted model
    /// request or context module cannot end the session.
    #[must_use]
    pub fn with_interrupt_shield(mut self, shield: Option<InterruptShield>) -> Self {
        self.shield = shield;
        self
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Flips the mode, replacing a trailing mode notice instead of stacking.
    pub fn toggle(&mut self) {
        self.mode = self.mode.toggled();
        self.conversation.pop_if_transient_mode_notice();
        self.conversation
            .push_system(format!("{MODE_NOTICE_PREFIX}{}", self.mode.as_str()));
        info!(mode = self.mode.as_str(), "mode switched");
    }

    #[must_use]
    pub fn prompt(&self, palette: Palette) -> String {
        let target = match self.mode {
            Mode::Prompt => self.session.agent_name().to_string(),
            Mode::Terminal => current_dir_label(),
        };
        let time = Local::now().format("%H:%M:%S").to_string();
        prompt_text(palette, self.mode, &time, &self.user, &target)
    }

    #[must_use]
    pub fn welcome_line(&self) -> String {
        format!("Welcome to AIsh (Use {} to switch mode)", self.toggle_key)
    }

    /// Reads and routes lines until `exit`/`quit` or end of input.
    ///
    /// Errors while handling a line are reported and recorded; only a
    /// failing input device ends the loop with an error.
    pub fn run(&mut self, io: &mut SessionIo<'_>) -> Result<(), ControllerError> {
        let welcome = self.welcome_line();
        io.console.line(&welcome);

        loop {
            let prompt = self.prompt(io.console.palette());
            match io.input.read_line(&prompt)? {
                ReadOutcome::Toggle => self.toggle(),
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof => break,
                ReadOutcome::Line(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if is_exit_command(line) {
                        break;
                    }
                    if let Err(error) = self.handle_line(line, io) {
                        self.report_error(&error, io);
                    }
                }
            }
        }

        info!(messages = self.conversation.len(), "session finished");
        Ok(())
    }

    /// One-shot mode: sends `message` to the agent and returns.
    pub fn run_once(
        &mut self,
        message: &str,
        io: &mut SessionIo<'_>,
    ) -> Result<RunSummary, ControllerError> {
        let welcome = self.welcome_line();
        io.console.line(&welcome);

        self.mode = Mode::Prompt;
        self.conversation.push_user(message);
        let _shielded = self.shield.as_ref().map(InterruptShield::hold);
        let summary = self.session.run(&mut self.conversation, io)?;
        Ok(summary)
    }

    /// Routes one non-empty line according to the active mode.
    pub fn handle_line(&mut self, line: &str, io: &mut SessionIo<'_>) -> Result<(), ControllerError> {
        let shield = self.shield.clone();
        let _shielded = shield.as_ref().map(InterruptShield::hold);
        match self.mode {
            Mode::Terminal => self.run_terminal_line(line, io),
            Mode::Prompt => {
                self.conversation.push_user(line);
                self.session.run(&mut self.conversation, io)?;
                Ok(())
            }
        }
    }

    fn run_terminal_line(&mut self, line: &str, io: &mut SessionIo<'_>) -> Result<(), ControllerError> {
        self.conversation.push_user(line);
        let captured = io.shell.run(line)?;

        io.console.command_stdout(&captured.stdout);
        io.console.command_stderr(&captured.stderr);
        for stream in [&captured.stdout, &captured.stderr] {
            let content = stream.trim_end_matches('\n');
            if !content.is_empty() {
                self.conversation.push_system(content);
            }
        }
        if !captured.exit.success() {
            info!(command = %line, status = %captured.exit.label(), "terminal command did not succeed");
        }
        Ok(())
    }

    fn report_error(&mut self, error: &ControllerError, io: &mut SessionIo<'_>) {
        warn!(%error, mode = self.mode.as_str(), "line handling failed");
        io.console.error(&error.to_string());
        self.conversation.push_system(format!("System Error: {error}"));
    }
}
