//! Deterministic mock implementation of the shared `agent_provider` contract.
//!
//! This crate contains no transport/protocol logic and is intended for local
//! development and session-level integration testing.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use agent_provider::{ChatMessage, ChatProvider, ProviderError, ProviderProfile};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// Replies served by [`MockProvider::default`]: one command, then the end marker.
pub const DEFAULT_SCRIPT: [&str; 2] = [
    "Mock session ready. I can list files for you. <execute>ls</execute>",
    "Those are the files in the current directory. <end>",
];

/// Reply used once the scripted queue is exhausted.
pub const EXHAUSTED_REPLY: &str = "The mock provider has no more scripted replies. <end>";

#[derive(Debug, Default)]
struct ScriptState {
    replies: VecDeque<Result<String, ProviderError>>,
    requests: Vec<Vec<ChatMessage>>,
}

/// Deterministic mock provider used by `aish` tests and offline runs.
///
/// Replies are served first-in first-out. Every request's full message list is
/// recorded so tests can assert on what the session engine actually sent.
#[derive(Debug)]
pub struct MockProvider {
    model_id: String,
    state: Mutex<ScriptState>,
}

impl MockProvider {
    /// Creates a mock provider that answers with `replies` in order.
    #[must_use]
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_model("mock", replies)
    }

    /// Creates a mock provider reporting `model_id` in its profile.
    #[must_use]
    pub fn with_model<I, S>(model_id: impl Into<String>, replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model_id = sanitize_model_id(model_id.into());
        let replies = replies.into_iter().map(|reply| Ok(reply.into())).collect();

        Self {
            model_id,
            state: Mutex::new(ScriptState {
                replies,
                requests: Vec::new(),
            }),
        }
    }

    /// Queues another successful reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        lock_unpoisoned(&self.state)
            .replies
            .push_back(Ok(reply.into()));
    }

    /// Queues a failure for the next request.
    pub fn push_error(&self, error: ProviderError) {
        lock_unpoisoned(&self.state).replies.push_back(Err(error));
    }

    /// Returns every request received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        lock_unpoisoned(&self.state).requests.clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        lock_unpoisoned(&self.state).requests.len()
    }

    #[must_use]
    pub fn remaining_replies(&self) -> usize {
        lock_unpoisoned(&self.state).replies.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(DEFAULT_SCRIPT)
    }
}

impl ChatProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let mut state = lock_unpoisoned(&self.state);
        state.requests.push(messages.to_vec());
        state
            .replies
            .pop_front()
            .unwrap_or_else(|| Ok(EXHAUSTED_REPLY.to_string()))
    }
}

fn sanitize_model_id(model_id: String) -> String {
    let trimmed = model_id.trim();
    if trimmed.is_empty() {
        "mock".to_string()
    } else {
        trimmed.to_string()
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use agent_provider::ChatRole;

    use super::*;

    #[test]
    fn profile_exposes_explicit_mock_provider_identity() {
        let profile = MockProvider::new(Vec::<String>::new()).profile();

        assert_eq!(profile.provider_id, MOCK_PROVIDER_ID);
        assert_eq!(profile.model_id, "mock");
    }

    #[test]
    fn blank_model_id_falls_back_to_default() {
        let profile = MockProvider::with_model("  ", ["x"]).profile();
        assert_eq!(profile.model_id, "mock");
    }

    #[test]
    fn replies_are_served_in_order_and_requests_recorded() {
        let provider = MockProvider::new(["first", "second"]);

        let first = provider
            .complete(&[ChatMessage::user("one")])
            .expect("first reply");
        let second = provider
            .complete(&[ChatMessage::user("one"), ChatMessage::assistant("first")])
            .expect("second reply");

        assert_eq!(first, "first");
        assert_eq!(second, "second");
        assert_eq!(provider.request_count(), 2);

        let requests = provider.requests();
        assert_eq!(requests[1].len(), 2);
        assert_eq!(requests[1][1].role, ChatRole::Assistant);
    }

    #[test]
    fn queued_error_is_returned_once() {
        let provider = MockProvider::new(Vec::<String>::new());
        provider.push_error(ProviderError::new("backend down"));
        provider.push_reply("recovered <end>");

        let error = provider
            .complete(&[])
            .expect_err("queued error should surface");
        assert_eq!(error.message(), "backend down");
        assert_eq!(
            provider.complete(&[]).expect("next reply"),
            "recovered <end>"
        );
    }

    #[test]
    fn exhausted_script_ends_the_turn() {
        let provider = MockProvider::new(Vec::<String>::new());
        let reply = provider.complete(&[]).expect("fallback reply");

        assert_eq!(reply, EXHAUSTED_REPLY);
        assert!(reply.contains("<end>"));
        assert_eq!(provider.remaining_replies(), 0);
    }
}
