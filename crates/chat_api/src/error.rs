use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Error as JsonError, Value};

#[derive(Debug)]
pub enum ChatApiError {
    MissingApiKey,
    InvalidHeader(String),
    Request(reqwest::Error),
    Status(StatusCode, String),
    Serde(JsonError),
    EmptyCompletion,
    RetryExhausted {
        status: Option<StatusCode>,
        last_error: Option<String>,
    },
    Unknown(String),
}

impl ChatApiError {
    /// True for failures a caller could reasonably retry later.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Status(status, _) => {
                crate::retry::is_retryable_http_error(status.as_u16(), "")
            }
            Self::RetryExhausted { .. } => true,
            Self::Request(error) => error.is_timeout() || error.is_connect(),
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    /// OpenAI sends a string code, OpenRouter a numeric one.
    pub code: Option<Value>,
    #[serde(rename = "type")]
    pub type_: Option<String>,
}

impl ErrorPayloadFields {
    fn code_label(&self) -> Option<String> {
        match &self.code {
            Some(Value::String(code)) if !code.is_empty() => Some(code.clone()),
            Some(Value::Number(code)) => Some(code.to_string()),
            _ => self.type_.clone().filter(|value| !value.is_empty()),
        }
    }

    pub fn describe(&self) -> Option<String> {
        let message = self
            .message
            .as_deref()
            .and_then(non_empty_string)?
            .to_owned();
        Some(match self.code_label() {
            Some(code) => format!("{message} ({code})"),
            None => message,
        })
    }
}

impl fmt::Display for ChatApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::InvalidHeader(message) => write!(f, "invalid header: {message}"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::EmptyCompletion => write!(f, "completion contained no message content"),
            Self::RetryExhausted { status, last_error } => {
                let status = status
                    .map(|status| status.as_u16().to_string())
                    .unwrap_or_else(|| "n/a".to_owned());
                write!(f, "retry exhausted after max attempts (status: {status}, last_error: {last_error:?})")
            }
            Self::Unknown(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ChatApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Request(error) => Some(error),
            Self::Serde(error) => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ChatApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for ChatApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Extract a human-readable message from an error response body.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        if let Some(message) = payload.value.as_ref().and_then(ErrorPayloadFields::describe) {
            return message;
        }
    }

    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.trim().to_string()
    }
}

fn non_empty_string(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
