//! The session transcript.

use agent_provider::{ChatMessage, ChatRole};

/// Prefix of the transient system notice appended on every mode switch.
pub const MODE_NOTICE_PREFIX: &str = "Mode switched to ";

/// Ordered, append-only list of role-tagged messages for one session.
///
/// The only removal is [`Conversation::pop_if_transient_mode_notice`], which
/// keeps repeated mode toggles from stacking notices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    #[must_use]
    pub fn all(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Removes the last message when it is a mode-switch notice.
    pub fn pop_if_transient_mode_notice(&mut self) -> Option<ChatMessage> {
        let is_notice = self.messages.last().is_some_and(|message| {
            message.role == ChatRole::System && message.content.starts_with(MODE_NOTICE_PREFIX)
        });
        if is_notice {
            self.messages.pop()
        } else {
            None
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.append(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.append(ChatMessage::assistant(content));
    }

    pub fn push_system(&mut self, content: impl Into<String>) {
        self.append(ChatMessage::system(content));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}
