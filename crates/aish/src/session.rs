//! One agent request loop: build context, ask the model, act on directives.

use std::io;
use std::sync::Arc;

use agent_config::ResolvedSettings;
use agent_provider::{ChatMessage, ChatProvider, ProviderError};
use aish_term::{LineInput, ReadOutcome};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::context::ContextAggregator;
use crate::conversation::Conversation;
use crate::directives::{extract, has_end_marker, has_user_marker, sanitize};
use crate::executor::{execute_all, ConsentPrompt, ExecError, ShellRunner};
use crate::render::Console;

/// Chained turns allowed per request before the loop gives control back.
pub const DEFAULT_MAX_TURNS: usize = 25;
pub const MAX_TURNS_VAR: &str = "AISH_MAX_TURNS";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("model request failed: {0}")]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Exec(#[from] ExecError),
    #[error("failed to read user message: {0}")]
    Input(#[from] io::Error),
}

/// Why [`SessionContext::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    EndMarker,
    NoFollowUp,
    UserInputClosed,
    TurnLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub turns: usize,
    pub stop: StopReason,
}

/// Interactive collaborators a run needs.
pub struct SessionIo<'a> {
    pub input: &'a mut dyn LineInput,
    pub consent: &'a mut dyn ConsentPrompt,
    pub shell: &'a mut dyn ShellRunner,
    pub console: &'a mut Console,
}

/// Everything fixed for the life of a session, built once at startup.
pub struct SessionContext {
    agent_name: String,
    system_overview: String,
    persona_prompt: String,
    aggregator: ContextAggregator,
    provider: Arc<dyn ChatProvider>,
    max_turns: usize,
}

impl SessionContext {
    pub fn new(
        agent_name: impl Into<String>,
        system_overview: impl Into<String>,
        persona_prompt: impl Into<String>,
        aggregator: ContextAggregator,
        provider: Arc<dyn ChatProvider>,
    ) -> Self {
        Self {
            agent_name: agent_name.into(),
            system_overview: system_overview.into(),
            persona_prompt: persona_prompt.into(),
            aggregator,
            provider,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn from_settings(settings: &ResolvedSettings, provider: Arc<dyn ChatProvider>) -> Self {
        let aggregator = ContextAggregator::new(
            &settings.config_dir,
            &settings.persona.metadata.context_modules,
        );
        Self::new(
            settings.agent_name(),
            settings.system_overview.clone(),
            settings.persona.prompt.clone(),
            aggregator,
            provider,
        )
    }

    /// A zero cap is raised to one so every request gets at least one turn.
    #[must_use]
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    #[must_use]
    pub fn agent_name(&self) -> &str {
        &self.agent_name
    }

    #[must_use]
    pub fn aggregator(&self) -> &ContextAggregator {
        &self.aggregator
    }

    #[must_use]
    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    /// The three system messages (overview, persona, context) followed by
    /// the transcript. The system block is rebuilt on every call.
    #[must_use]
    pub fn build_messages(&self, conversation: &Conversation) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(conversation.len() + 3);
        messages.push(ChatMessage::system(self.system_overview.as_str()));
        messages.push(ChatMessage::system(self.persona_prompt.as_str()));
        messages.push(ChatMessage::system(self.aggregator.aggregate()));
        messages.extend_from_slice(conversation.all());
        messages
    }

    /// Chains turns until the model ends the exchange, stops asking for
    /// anything, the user declines to answer, or the turn cap is hit.
    ///
    /// On error everything appended so far stays in `conversation`.
    pub fn run(
        &self,
        conversation: &mut Conversation,
        io: &mut SessionIo<'_>,
    ) -> Result<RunSummary, SessionError> {
        let mut turns = 0;
        loop {
            if turns == self.max_turns {
                let notice = format!(
                    "Stopped after {turns} chained turns. Send a new message to continue."
                );
                warn!(turns, "turn limit reached");
                io.console.notice(&notice);
                conversation.push_system(notice);
                return Ok(self.summary(turns, StopReason::TurnLimit));
            }
            turns += 1;

            let response = self.request(conversation, turns)?;
            conversation.push_assistant(response.as_str());

            let display = sanitize(&response);
            if !display.is_empty() {
                io.console.assistant(&display);
            }

            let commands = extract(&response);
            let executed = execute_all(
                &commands,
                conversation,
                &mut *io.shell,
                &mut *io.consent,
                &mut *io.input,
                io.console,
            )?;

            if has_end_marker(&response) {
                return Ok(self.summary(turns, StopReason::EndMarker));
            }
            if executed {
                continue;
            }
            if has_user_marker(&response) {
                match read_user_message(io)? {
                    Some(message) => {
                        conversation.push_user(message);
                        continue;
                    }
                    None => return Ok(self.summary(turns, StopReason::UserInputClosed)),
                }
            }
            return Ok(self.summary(turns, StopReason::NoFollowUp));
        }
    }

    fn request(&self, conversation: &Conversation, turn: usize) -> Result<String, SessionError> {
        let messages = self.build_messages(conversation);
        let bytes: usize = messages.iter().map(|message| message.content.len()).sum();
        info!(turn, agent = %self.agent_name, "requesting completion");
        debug!(turn, messages = messages.len(), bytes, "request size");

        let response = self.provider.complete(&messages).map_err(|error| {
            warn!(turn, %error, retryable = error.is_retryable(), "completion failed");
            error
        })?;
        debug!(turn, bytes = response.len(), "completion received");
        Ok(response)
    }

    fn summary(&self, turns: usize, stop: StopReason) -> RunSummary {
        info!(turns, ?stop, agent = %self.agent_name, "request loop finished");
        RunSummary { turns, stop }
    }
}

/// Reads the follow-up the model asked for. Blank answers and toggles
/// re-ask; an interrupt or end of input yields `None`.
fn read_user_message(io: &mut SessionIo<'_>) -> io::Result<Option<String>> {
    let palette = io.console.palette();
    let prompt = format!(
        "{}{} ",
        palette.paint("1;44", " USER "),
        palette.paint("1;42", " MESSAGE ")
    );
    loop {
        match io.input.read_line(&prompt)? {
            ReadOutcome::Line(line) if line.trim().is_empty() => continue,
            ReadOutcome::Line(line) => return Ok(Some(line)),
            ReadOutcome::Toggle => continue,
            ReadOutcome::Interrupted | ReadOutcome::Eof => return Ok(None),
        }
    }
}

/// Reads the turn cap from the environment, ignoring unparsable values.
#[must_use]
pub fn max_turns_from_env() -> usize {
    std::env::var(MAX_TURNS_VAR)
        .ok()
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_TURNS)
}
