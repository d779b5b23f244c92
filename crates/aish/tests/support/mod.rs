#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Arc;

use agent_provider::ChatProvider;
use agent_provider_mock::MockProvider;
use aish::context::ContextAggregator;
use aish::process::Captured;
use aish::{
    Console, Consent, ConsentPrompt, ExecError, SessionContext, SessionIo, ShellRunner,
    SystemShell,
};
use aish_term::{LineInput, Palette, ReadOutcome};

#[derive(Clone, Default)]
pub struct Buffer(Rc<RefCell<Vec<u8>>>);

impl Buffer {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Serves queued read outcomes, then end of input. Records every prompt.
#[derive(Default)]
pub struct ScriptedInput {
    outcomes: VecDeque<ReadOutcome>,
    pub prompts: Vec<String>,
}

impl ScriptedInput {
    pub fn new(outcomes: impl IntoIterator<Item = ReadOutcome>) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            prompts: Vec::new(),
        }
    }

    pub fn lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(lines.into_iter().map(|line| ReadOutcome::Line(line.to_string())))
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.len()
    }
}

impl LineInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<ReadOutcome> {
        self.prompts.push(prompt.to_string());
        Ok(self.outcomes.pop_front().unwrap_or(ReadOutcome::Eof))
    }
}

/// Answers consent from a queue; refuses once the queue is empty.
#[derive(Default)]
pub struct ScriptedConsent {
    answers: VecDeque<Consent>,
    pub asked: Vec<String>,
}

impl ScriptedConsent {
    pub fn new(answers: impl IntoIterator<Item = Consent>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl ConsentPrompt for ScriptedConsent {
    fn ask(
        &mut self,
        command: &str,
        _input: &mut dyn LineInput,
        _console: &mut Console,
    ) -> io::Result<Consent> {
        self.asked.push(command.to_string());
        Ok(self.answers.pop_front().unwrap_or(Consent::No))
    }
}

/// Real `sh -c` execution that remembers what it ran.
pub struct RecordingShell {
    inner: SystemShell,
    pub ran: Vec<String>,
}

impl RecordingShell {
    pub fn new(inner: SystemShell) -> Self {
        Self {
            inner,
            ran: Vec::new(),
        }
    }
}

impl Default for RecordingShell {
    fn default() -> Self {
        Self::new(SystemShell::new())
    }
}

impl ShellRunner for RecordingShell {
    fn run(&mut self, command: &str) -> Result<Captured, ExecError> {
        self.ran.push(command.to_string());
        self.inner.run(command)
    }
}

pub struct Harness {
    pub input: ScriptedInput,
    pub consent: ScriptedConsent,
    pub shell: RecordingShell,
    pub out: Buffer,
    pub err: Buffer,
    pub console: Console,
}

impl Harness {
    pub fn new(input: ScriptedInput, consent: ScriptedConsent) -> Self {
        let (out, err) = (Buffer::default(), Buffer::default());
        let console = Console::new(out.clone(), err.clone(), Palette::plain());
        Self {
            input,
            consent,
            shell: RecordingShell::default(),
            out,
            err,
            console,
        }
    }

    pub fn with_shell(mut self, shell: SystemShell) -> Self {
        self.shell = RecordingShell::new(shell);
        self
    }

    pub fn io(&mut self) -> SessionIo<'_> {
        SessionIo {
            input: &mut self.input,
            consent: &mut self.consent,
            shell: &mut self.shell,
            console: &mut self.console,
        }
    }
}

pub fn mock<'a>(replies: impl IntoIterator<Item = &'a str>) -> Arc<MockProvider> {
    Arc::new(MockProvider::new(replies))
}

pub fn session_with(provider: &Arc<MockProvider>, aggregator: ContextAggregator) -> SessionContext {
    let provider: Arc<dyn ChatProvider> = Arc::clone(provider) as Arc<dyn ChatProvider>;
    SessionContext::new("shell", "OVERVIEW", "PERSONA", aggregator, provider)
}

pub fn session(provider: &Arc<MockProvider>) -> SessionContext {
    session_with(
        provider,
        ContextAggregator::new("/nonexistent-config", Vec::<String>::new()),
    )
}
