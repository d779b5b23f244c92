//! Transport-only client for OpenAI-compatible chat completion endpoints.
//!
//! This crate owns request building, retry policy, and response parsing for
//! `POST {base}/chat/completions`. It has no knowledge of conversations,
//! directives, or terminal I/O. Responses are requested non-streaming.

pub mod client;
pub mod config;
pub mod error;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod url;

pub use client::ChatApiClient;
pub use config::ChatApiConfig;
pub use error::ChatApiError;
pub use payload::{ChatCompletionRequest, ChatCompletionResponse, WireMessage};
pub use url::normalize_chat_completions_url;
