mod support;

use std::sync::Arc;

use agent_provider::{ChatMessage, ChatProvider, ProviderError, ProviderProfile};
use aish::context::ContextAggregator;
use aish::process::InterruptShield;
use aish::{Controller, SessionContext, StopReason};
use pretty_assertions::assert_eq;
use signal_hook::consts::SIGINT;

use support::{Harness, ScriptedConsent, ScriptedInput};

/// Delivers Ctrl-C to the process in the middle of a completion.
struct InterruptedProvider;

impl ChatProvider for InterruptedProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: "test".to_string(),
            model_id: "test".to_string(),
        }
    }

    fn complete(&self, _messages: &[ChatMessage]) -> Result<String, ProviderError> {
        signal_hook::low_level::raise(SIGINT).map_err(|error| ProviderError::new(error.to_string()))?;
        Ok("still here".to_string())
    }
}

#[test]
fn ctrl_c_during_a_model_request_leaves_the_session_running() {
    let shield = InterruptShield::install().expect("register SIGINT handler");
    let session = SessionContext::new(
        "shell",
        "OVERVIEW",
        "PERSONA",
        ContextAggregator::new("/nonexistent-config", Vec::<String>::new()),
        Arc::new(InterruptedProvider),
    );
    let mut controller =
        Controller::new(&session, "ctrl+space").with_interrupt_shield(Some(shield.clone()));
    let mut harness = Harness::new(ScriptedInput::default(), ScriptedConsent::default());

    let summary = controller
        .run_once("wait for it", &mut harness.io())
        .expect("run should finish");

    assert_eq!(summary.stop, StopReason::NoFollowUp);
    assert!(harness.out.text().ends_with("still here\n"));
    assert_eq!(controller.conversation().len(), 2);
    assert!(!shield.is_held());
}
