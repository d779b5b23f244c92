use std::collections::BTreeMap;

use crate::config::ChatApiConfig;
use crate::error::ChatApiError;

pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_USER_AGENT: &str = "user-agent";

/// Build a deterministic header map for chat completion requests.
pub fn build_headers(config: &ChatApiConfig) -> Result<BTreeMap<String, String>, ChatApiError> {
    let api_key = config.api_key.trim();
    if api_key.is_empty() {
        return Err(ChatApiError::MissingApiKey);
    }

    let mut headers = BTreeMap::new();
    headers.insert(HEADER_AUTHORIZATION.to_owned(), format!("Bearer {api_key}"));
    headers.insert(HEADER_ACCEPT.to_owned(), "application/json".to_owned());
    headers.insert(
        HEADER_CONTENT_TYPE.to_owned(),
        "application/json".to_owned(),
    );

    let ua = config
        .user_agent
        .as_deref()
        .and_then(sanitize_nonempty)
        .unwrap_or_else(default_user_agent);
    headers.insert(HEADER_USER_AGENT.to_owned(), ua);

    for (key, value) in &config.extra_headers {
        let Some(key) = sanitize_nonempty(key) else {
            continue;
        };
        headers.insert(key.to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}

fn sanitize_nonempty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_owned())
    }
}

fn default_user_agent() -> String {
    format!(
        "aish/{} ({} {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_rejected() {
        let error = build_headers(&ChatApiConfig::new("  ")).expect_err("blank key");
        assert!(matches!(error, ChatApiError::MissingApiKey));
    }

    #[test]
    fn extra_headers_are_lowercased_and_override_defaults() {
        let config = ChatApiConfig::new("sk-test")
            .insert_header("X-Title", " aish ")
            .insert_header("Accept", "text/plain")
            .insert_header("  ", "dropped");
        let headers = build_headers(&config).expect("headers");

        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(headers["x-title"], "aish");
        assert_eq!(headers["accept"], "text/plain");
        assert!(!headers.contains_key(""));
    }

    #[test]
    fn default_user_agent_names_the_client() {
        let headers = build_headers(&ChatApiConfig::new("k")).expect("headers");
        assert!(headers[HEADER_USER_AGENT].starts_with("aish/"));
    }
}
