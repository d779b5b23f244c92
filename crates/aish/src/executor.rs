//! Consent-gated shell execution of extracted directives.

use std::io;
use std::process::{Command, Stdio};
use std::time::Duration;

use aish_term::{LineInput, ReadOutcome};
use thiserror::Error;
use tracing::{info, warn};

use crate::conversation::Conversation;
use crate::process::{capture, truncate_to_byte_limit, Captured, InterruptShield};
use crate::render::Console;

pub const DEFAULT_SHELL: &str = "sh";
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);
/// Per-stream cap on captured output kept for display and the transcript.
pub const MAX_CAPTURE_BYTES: usize = 100 * 1024;

const CONSENT_PROMPT: &str = "Run it? [Y/n] ";

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to launch `{shell}`: {source}")]
    Spawn {
        shell: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to read consent for `{command}`: {source}")]
    Consent {
        command: String,
        #[source]
        source: io::Error,
    },
}

/// Runs one command line through a shell and captures its output.
pub trait ShellRunner {
    fn run(&mut self, command: &str) -> Result<Captured, ExecError>;
}

/// `sh -c COMMAND` with inherited stdin and captured stdout/stderr.
#[derive(Debug, Clone)]
pub struct SystemShell {
    shell: String,
    timeout: Duration,
    max_output_bytes: usize,
    shield: Option<InterruptShield>,
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemShell {
    #[must_use]
    pub fn new() -> Self {
        Self {
            shell: DEFAULT_SHELL.to_string(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
            max_output_bytes: MAX_CAPTURE_BYTES,
            shield: None,
        }
    }

    #[must_use]
    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_output_bytes(mut self, max_output_bytes: usize) -> Self {
        self.max_output_bytes = max_output_bytes;
        self
    }

    #[must_use]
    pub fn with_interrupt_shield(mut self, shield: Option<InterruptShield>) -> Self {
        self.shield = shield;
        self
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl ShellRunner for SystemShell {
    fn run(&mut self, command: &str) -> Result<Captured, ExecError> {
        let child = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                shell: self.shell.clone(),
                source,
            })?;

        let _shielded = self.shield.as_ref().map(InterruptShield::hold);
        let mut captured = capture(child, self.timeout);
        captured.stdout = truncate_to_byte_limit(captured.stdout, self.max_output_bytes);
        captured.stderr = truncate_to_byte_limit(captured.stderr, self.max_output_bytes);
        Ok(captured)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consent {
    Yes,
    No,
}

impl Consent {
    /// `""`, `y`, `yes` approve; `n`, `no` refuse; case-insensitive.
    #[must_use]
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "" | "y" | "yes" => Some(Self::Yes),
            "n" | "no" => Some(Self::No),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "y",
            Self::No => "n",
        }
    }
}

/// Asks whether one exact command may run.
pub trait ConsentPrompt {
    fn ask(
        &mut self,
        command: &str,
        input: &mut dyn LineInput,
        console: &mut Console,
    ) -> io::Result<Consent>;
}

/// Interactive consent: shows the command, then reads answers until one
/// parses. An interrupted or closed read refuses.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineConsent;

impl ConsentPrompt for LineConsent {
    fn ask(
        &mut self,
        command: &str,
        input: &mut dyn LineInput,
        console: &mut Console,
    ) -> io::Result<Consent> {
        let palette = console.palette();
        let header = format!(
            "{} {}",
            palette.paint("1;41", " EXECUTE "),
            palette.paint("1;42", &format!(" {command} "))
        );
        console.line(&header);

        loop {
            match input.read_line(CONSENT_PROMPT)? {
                ReadOutcome::Line(answer) => match Consent::parse(&answer) {
                    Some(consent) => return Ok(consent),
                    None => console.notice("Please answer y or n."),
                },
                ReadOutcome::Toggle => continue,
                ReadOutcome::Interrupted | ReadOutcome::Eof => return Ok(Consent::No),
            }
        }
    }
}

/// One consented, executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub command: String,
    pub consent: Consent,
    pub captured: Captured,
}

impl CommandRecord {
    /// Transcript text: the consent line, stdout, then stderr and the exit
    /// status when there is something to report.
    #[must_use]
    pub fn transcript_entry(&self) -> String {
        let mut entry = format!(
            "EXECUTE {} {CONSENT_PROMPT}{}\n{}",
            self.command,
            self.consent.as_str(),
            self.captured.stdout.trim_end_matches('\n')
        );
        let stderr = self.captured.stderr.trim_end_matches('\n');
        if !stderr.is_empty() {
            entry.push_str("\nstderr:\n");
            entry.push_str(stderr);
        }
        if !self.captured.exit.success() {
            entry.push_str("\nstatus: ");
            entry.push_str(&self.captured.exit.label());
        }
        entry
    }
}

/// Asks consent for `command`; on yes runs it, echoes its output and returns
/// the record. A refusal has no side effects and returns `None`.
pub fn execute_with_consent(
    command: &str,
    shell: &mut dyn ShellRunner,
    consent: &mut dyn ConsentPrompt,
    input: &mut dyn LineInput,
    console: &mut Console,
) -> Result<Option<CommandRecord>, ExecError> {
    let decision = consent
        .ask(command, input, console)
        .map_err(|source| ExecError::Consent {
            command: command.to_string(),
            source,
        })?;
    if decision == Consent::No {
        info!(%command, "command declined");
        return Ok(None);
    }

    info!(%command, "running command");
    let captured = shell.run(command)?;
    if !captured.exit.success() {
        warn!(%command, status = %captured.exit.label(), "command did not succeed");
    }
    console.command_stdout(&captured.stdout);
    console.command_stderr(&captured.stderr);

    Ok(Some(CommandRecord {
        command: command.to_string(),
        consent: decision,
        captured,
    }))
}

/// Runs every consented command in order and appends their records to
/// `conversation` as one System message, blank-line separated. Returns
/// whether anything ran.
///
/// A failure stops the batch, but the records of commands that already ran
/// are appended before the error is returned.
pub fn execute_all(
    commands: &[String],
    conversation: &mut Conversation,
    shell: &mut dyn ShellRunner,
    consent: &mut dyn ConsentPrompt,
    input: &mut dyn LineInput,
    console: &mut Console,
) -> Result<bool, ExecError> {
    let mut entries = Vec::new();
    let mut failure = None;
    for command in commands {
        match execute_with_consent(command, shell, consent, input, console) {
            Ok(Some(record)) => entries.push(record.transcript_entry()),
            Ok(None) => {}
            Err(error) => {
                failure = Some(error);
                break;
            }
        }
    }

    let executed = !entries.is_empty();
    if executed {
        conversation.push_system(entries.join("\n\n"));
    }
    match failure {
        Some(error) => Err(error),
        None => Ok(executed),
    }
}
