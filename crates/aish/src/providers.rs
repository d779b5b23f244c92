//! Maps resolved settings to a concrete chat provider.

use std::sync::Arc;
use std::time::Duration;

use agent_config::ResolvedSettings;
use agent_provider::{ChatProvider, ProviderInitError};
use agent_provider_chat_api::{api_key_env_for, ChatApiProvider, ChatApiProviderConfig};
use agent_provider_mock::{MockProvider, DEFAULT_SCRIPT, MOCK_PROVIDER_ID};
use tracing::debug;

pub fn provider_for_settings(
    settings: &ResolvedSettings,
) -> Result<Arc<dyn ChatProvider>, ProviderInitError> {
    provider_for_id(&settings.provider, settings, |name| std::env::var(name).ok())
}

/// Builds the provider named `provider_id`, reading API keys through `env`.
///
/// Anything but `mock` goes to the chat-completions adapter, which rejects
/// unknown providers without a base URL and blank keys.
pub fn provider_for_id(
    provider_id: &str,
    settings: &ResolvedSettings,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn ChatProvider>, ProviderInitError> {
    if provider_id == MOCK_PROVIDER_ID {
        return Ok(Arc::new(MockProvider::with_model(
            settings.model.as_str(),
            DEFAULT_SCRIPT,
        )));
    }
    let connection = &settings.connection;
    let custom_key_var = connection
        .api_key_env
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());
    let api_key = custom_key_var
        .or_else(|| api_key_env_for(provider_id))
        .and_then(|name| env(name))
        .unwrap_or_default();

    let mut config = ChatApiProviderConfig::new(provider_id, api_key, settings.model.as_str())
        .with_timeout(Duration::from_secs(connection.timeout_sec()));
    if let Some(name) = custom_key_var {
        config = config.with_api_key_env(name);
    }
    if let Some(base_url) = connection.base_url.as_deref() {
        config = config.with_base_url(base_url);
    }
    if let Some(temperature) = connection.temperature {
        config = config.with_temperature(temperature);
    }

    debug!(provider = provider_id, model = %settings.model, "building chat provider");
    Ok(Arc::new(ChatApiProvider::new(config)?))
}
