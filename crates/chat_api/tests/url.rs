use chat_api::normalize_chat_completions_url;
use chat_api::url::{DEFAULT_OPENAI_BASE_URL, OPENROUTER_BASE_URL};

#[test]
fn url_normalization_keeps_existing_completions_endpoint() {
    assert_eq!(
        normalize_chat_completions_url("https://openrouter.ai/api/v1/chat/completions/"),
        "https://openrouter.ai/api/v1/chat/completions"
    );
}

#[test]
fn url_normalization_appends_completions_to_chat_base() {
    assert_eq!(
        normalize_chat_completions_url("http://localhost:8080/v1/chat"),
        "http://localhost:8080/v1/chat/completions"
    );
}

#[test]
fn url_normalization_appends_chat_completions_to_generic_base() {
    assert_eq!(
        normalize_chat_completions_url(OPENROUTER_BASE_URL),
        "https://openrouter.ai/api/v1/chat/completions"
    );
}

#[test]
fn blank_base_url_uses_openai_default() {
    assert_eq!(
        normalize_chat_completions_url("  "),
        format!("{DEFAULT_OPENAI_BASE_URL}/chat/completions")
    );
}
