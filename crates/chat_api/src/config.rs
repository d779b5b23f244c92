use std::collections::BTreeMap;
use std::time::Duration;

use crate::retry::{BASE_DELAY_MS, MAX_RETRIES};
use crate::url::DEFAULT_OPENAI_BASE_URL;

/// Transport configuration for chat completion requests.
#[derive(Debug, Clone)]
pub struct ChatApiConfig {
    /// Bearer token passed to `Authorization`.
    pub api_key: String,
    /// Base URL for the OpenAI-compatible API.
    pub base_url: String,
    /// Optional `User-Agent` override.
    pub user_agent: Option<String>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
    /// Optional whole-request timeout.
    pub timeout: Option<Duration>,
    /// Retry attempts after the initial request.
    pub max_retries: u32,
    /// First backoff delay; doubled on every retry.
    pub retry_base_delay: Duration,
}

impl Default for ChatApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            user_agent: None,
            extra_headers: BTreeMap::new(),
            timeout: None,
            max_retries: MAX_RETRIES,
            retry_base_delay: Duration::from_millis(BASE_DELAY_MS),
        }
    }
}

impl ChatApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }
}
