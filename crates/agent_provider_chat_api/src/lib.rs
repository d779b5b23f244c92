//! Chat-completions-backed implementation of the shared `agent_provider` contract.
//!
//! This adapter translates role-tagged `ChatMessage` history into
//! `chat_api` wire payloads and blocks on a current-thread runtime so the
//! session engine stays synchronous.

use std::sync::Arc;
use std::time::Duration;

use agent_provider::{ChatMessage, ChatProvider, ProviderError, ProviderInitError, ProviderProfile};
use chat_api::url::{DEFAULT_OPENAI_BASE_URL, OPENROUTER_BASE_URL};
use chat_api::{ChatApiClient, ChatApiConfig, ChatApiError, ChatCompletionRequest, WireMessage};
use url::Url;

/// Provider identifier for OpenRouter.
pub const OPENROUTER_PROVIDER_ID: &str = "openrouter";
/// Provider identifier for the OpenAI API.
pub const OPENAI_PROVIDER_ID: &str = "openai";

/// Provider ids this adapter can serve, in display order.
pub const SUPPORTED_PROVIDER_IDS: &[&str] = &[OPENROUTER_PROVIDER_ID, OPENAI_PROVIDER_ID];

/// Environment variable holding the API key for `provider_id`.
#[must_use]
pub fn api_key_env_for(provider_id: &str) -> Option<&'static str> {
    match provider_id {
        OPENROUTER_PROVIDER_ID => Some("OPENROUTER_API_KEY"),
        OPENAI_PROVIDER_ID => Some("OPENAI_API_KEY"),
        _ => None,
    }
}

fn default_base_url_for(provider_id: &str) -> Option<&'static str> {
    match provider_id {
        OPENROUTER_PROVIDER_ID => Some(OPENROUTER_BASE_URL),
        OPENAI_PROVIDER_ID => Some(DEFAULT_OPENAI_BASE_URL),
        _ => None,
    }
}

/// Runtime configuration for a chat-completions provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatApiProviderConfig {
    pub provider_id: String,
    pub api_key: String,
    pub model_id: String,
    /// Variable the key was read from, for error hints.
    pub api_key_env: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
    pub temperature: Option<f64>,
}

impl ChatApiProviderConfig {
    #[must_use]
    pub fn new(
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        model_id: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            api_key: api_key.into(),
            model_id: model_id.into(),
            api_key_env: None,
            base_url: None,
            timeout: None,
            temperature: None,
        }
    }

    #[must_use]
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn resolved_base_url(&self) -> Result<String, ProviderInitError> {
        let base_url = match self.base_url.as_deref().map(str::trim) {
            Some(explicit) if !explicit.is_empty() => explicit.to_string(),
            _ => default_base_url_for(&self.provider_id)
                .ok_or_else(|| unsupported_provider(&self.provider_id))?
                .to_string(),
        };

        let parsed = Url::parse(&base_url).map_err(|error| {
            ProviderInitError::new(format!("Invalid base URL '{base_url}': {error}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ProviderInitError::new(format!(
                "Invalid base URL '{base_url}': scheme must be http or https"
            )));
        }

        Ok(base_url)
    }

    fn into_chat_api_config(self) -> Result<ChatApiConfig, ProviderInitError> {
        let base_url = self.resolved_base_url()?;
        if self.api_key.trim().is_empty() {
            let hint = self
                .api_key_env
                .as_deref()
                .or_else(|| api_key_env_for(&self.provider_id))
                .map(|name| format!(" (set {name})"))
                .unwrap_or_default();
            return Err(ProviderInitError::new(format!(
                "Missing API key for provider '{}'{hint}",
                self.provider_id
            )));
        }

        let mut config = ChatApiConfig::new(self.api_key.trim()).with_base_url(base_url);

        if self.provider_id == OPENROUTER_PROVIDER_ID {
            config = config.insert_header("X-Title", "aish");
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        Ok(config)
    }
}

trait CompletionClient: Send + Sync {
    fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ChatApiError>;
}

#[derive(Debug)]
struct DefaultCompletionClient {
    client: ChatApiClient,
}

impl CompletionClient for DefaultCompletionClient {
    fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ChatApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                ChatApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.complete_text(request))
    }
}

/// `ChatProvider` adapter backed by `chat_api` transport primitives.
pub struct ChatApiProvider {
    provider_id: String,
    model_id: String,
    temperature: Option<f64>,
    client: Arc<dyn CompletionClient>,
}

impl ChatApiProvider {
    /// Creates a provider using real HTTP transport.
    pub fn new(config: ChatApiProviderConfig) -> Result<Self, ProviderInitError> {
        let provider_id = config.provider_id.trim().to_string();
        let model_id = sanitize_model_id(&config.model_id)?;
        let temperature = config.temperature;
        let client = Arc::new(DefaultCompletionClient {
            client: ChatApiClient::new(config.into_chat_api_config()?).map_err(map_init_error)?,
        });

        Ok(Self {
            provider_id,
            model_id,
            temperature,
            client,
        })
    }

    fn build_request(&self, messages: &[ChatMessage]) -> ChatCompletionRequest {
        let wire = messages
            .iter()
            .map(|message| WireMessage::new(message.role.as_str(), message.content.as_str()))
            .collect();
        let mut request = ChatCompletionRequest::new(self.model_id.clone(), wire);
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }

    #[cfg(test)]
    fn with_client_for_tests(model_id: &str, client: Arc<dyn CompletionClient>) -> Self {
        Self {
            provider_id: OPENROUTER_PROVIDER_ID.to_string(),
            model_id: model_id.to_string(),
            temperature: None,
            client,
        }
    }
}

impl ChatProvider for ChatApiProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: self.provider_id.clone(),
            model_id: self.model_id.clone(),
        }
    }

    fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        let request = self.build_request(messages);
        self.client.complete(&request).map_err(|error| {
            let message = format!("{} request failed: {error}", self.provider_id);
            if error.is_transient() {
                ProviderError::retryable(message)
            } else {
                ProviderError::new(message)
            }
        })
    }
}

fn sanitize_model_id(model_id: &str) -> Result<String, ProviderInitError> {
    let trimmed = model_id.trim();
    if trimmed.is_empty() {
        return Err(ProviderInitError::new("A model id is required"));
    }
    Ok(trimmed.to_string())
}

fn unsupported_provider(provider_id: &str) -> ProviderInitError {
    ProviderInitError::new(format!(
        "Unsupported provider '{provider_id}'. Available providers: {}",
        SUPPORTED_PROVIDER_IDS.join(", ")
    ))
}

fn map_init_error(error: ChatApiError) -> ProviderInitError {
    ProviderInitError::new(format!("Failed to initialize chat provider: {error}"))
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, MutexGuard};

    use super::*;

    struct FakeCompletionClient {
        observed: Mutex<Vec<ChatCompletionRequest>>,
        outcome: Mutex<Option<Result<String, ChatApiError>>>,
    }

    impl FakeCompletionClient {
        fn with(outcome: Result<String, ChatApiError>) -> Arc<Self> {
            Arc::new(Self {
                observed: Mutex::new(Vec::new()),
                outcome: Mutex::new(Some(outcome)),
            })
        }

        fn observed(&self) -> Vec<ChatCompletionRequest> {
            lock(&self.observed).clone()
        }
    }

    impl CompletionClient for FakeCompletionClient {
        fn complete(&self, request: &ChatCompletionRequest) -> Result<String, ChatApiError> {
            lock(&self.observed).push(request.clone());
            lock(&self.outcome)
                .take()
                .expect("fake outcome should be consumed exactly once")
        }
    }

    fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[test]
    fn complete_maps_roles_and_model_onto_wire_request() {
        let fake = FakeCompletionClient::with(Ok("hello <end>".to_string()));
        let provider = ChatApiProvider::with_client_for_tests("openai/gpt-4o-mini", fake.clone());

        let reply = provider
            .complete(&[
                ChatMessage::system("overview"),
                ChatMessage::user("hi"),
                ChatMessage::assistant("earlier"),
            ])
            .expect("fake completion should succeed");

        assert_eq!(reply, "hello <end>");
        let observed = fake.observed();
        assert_eq!(observed.len(), 1);
        assert_eq!(observed[0].model, "openai/gpt-4o-mini");
        let roles: Vec<&str> = observed[0]
            .messages
            .iter()
            .map(|message| message.role.as_str())
            .collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
        assert_eq!(observed[0].messages[1].content.as_deref(), Some("hi"));
    }

    #[test]
    fn transport_failure_maps_to_provider_error() {
        let fake = FakeCompletionClient::with(Err(ChatApiError::EmptyCompletion));
        let provider = ChatApiProvider::with_client_for_tests("m", fake);

        let error = provider
            .complete(&[ChatMessage::user("hi")])
            .expect_err("transport error should surface");

        assert!(!error.is_retryable());
        assert_eq!(
            error.message(),
            "openrouter request failed: completion contained no message content"
        );
    }

    #[test]
    fn exhausted_retries_are_reported_as_retryable() {
        let fake = FakeCompletionClient::with(Err(ChatApiError::RetryExhausted {
            status: None,
            last_error: Some("connection refused".to_string()),
        }));
        let provider = ChatApiProvider::with_client_for_tests("m", fake);

        let error = provider
            .complete(&[ChatMessage::user("hi")])
            .expect_err("transport error should surface");
        assert!(error.is_retryable());
    }

    #[test]
    fn profile_reports_provider_and_model() {
        let provider = ChatApiProvider::new(ChatApiProviderConfig::new(
            OPENROUTER_PROVIDER_ID,
            "sk-test",
            " openai/gpt-4o ",
        ))
        .expect("provider should initialize");

        let profile = provider.profile();
        assert_eq!(profile.provider_id, "openrouter");
        assert_eq!(profile.model_id, "openai/gpt-4o");
    }

    #[test]
    fn missing_api_key_names_the_env_var() {
        let error = ChatApiProvider::new(ChatApiProviderConfig::new(
            OPENROUTER_PROVIDER_ID,
            "",
            "model",
        ))
        .err()
        .expect("blank key should fail");

        assert!(error.message().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn missing_api_key_hint_prefers_configured_variable() {
        let error = ChatApiProvider::new(
            ChatApiProviderConfig::new(OPENAI_PROVIDER_ID, " ", "model")
                .with_api_key_env("TEAM_OPENAI_KEY"),
        )
        .err()
        .expect("blank key should fail");

        assert_eq!(
            error.message(),
            "Missing API key for provider 'openai' (set TEAM_OPENAI_KEY)"
        );
    }

    #[test]
    fn unknown_provider_without_base_url_is_rejected() {
        let error = ChatApiProvider::new(ChatApiProviderConfig::new("acme", "k", "model"))
            .err()
            .expect("unknown provider should fail");

        assert_eq!(
            error.message(),
            "Unsupported provider 'acme'. Available providers: openrouter, openai"
        );
    }

    #[test]
    fn explicit_base_url_allows_compatible_endpoints() {
        let provider = ChatApiProvider::new(
            ChatApiProviderConfig::new("local", "k", "llama3")
                .with_base_url("http://127.0.0.1:11434/v1")
                .with_timeout(Duration::from_secs(5)),
        )
        .expect("compatible endpoint should initialize");
        assert_eq!(provider.profile().provider_id, "local");
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let error = ChatApiProvider::new(
            ChatApiProviderConfig::new(OPENAI_PROVIDER_ID, "k", "m").with_base_url("ftp://x"),
        )
        .err()
        .expect("ftp scheme should fail");
        assert!(error.message().contains("scheme must be http or https"));
    }

    #[test]
    fn blank_model_is_rejected() {
        let error = ChatApiProvider::new(ChatApiProviderConfig::new(OPENAI_PROVIDER_ID, "k", " "))
            .err()
            .expect("blank model should fail");
        assert_eq!(error.message(), "A model id is required");
    }
}
