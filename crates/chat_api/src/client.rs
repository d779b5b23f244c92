use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response, StatusCode};

use crate::config::ChatApiConfig;
use crate::error::{parse_error_message, ChatApiError};
use crate::headers::build_headers;
use crate::payload::{ChatCompletionRequest, ChatCompletionResponse};
use crate::retry::{is_retryable_http_error, retry_delay_from};
use crate::url::normalize_chat_completions_url;

#[derive(Debug)]
pub struct ChatApiClient {
    http: Client,
    config: ChatApiConfig,
}

impl ChatApiClient {
    pub fn new(config: ChatApiConfig) -> Result<Self, ChatApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ChatApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &ChatApiConfig {
        &self.config
    }

    pub fn normalized_endpoint(&self) -> String {
        normalize_chat_completions_url(&self.config.base_url)
    }

    pub fn build_headers(&self) -> Result<HeaderMap, ChatApiError> {
        let headers = build_headers(&self.config)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ChatApiError::InvalidHeader(format!("invalid header key: {key}")))?,
                HeaderValue::from_str(&value).map_err(|_| {
                    ChatApiError::InvalidHeader(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<reqwest::RequestBuilder, ChatApiError> {
        let headers = self.build_headers()?;
        let mut payload = request.clone();
        payload.stream = false;
        Ok(self
            .http
            .post(self.normalized_endpoint())
            .headers(headers)
            .json(&payload))
    }

    pub async fn send_with_retry(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<Response, ChatApiError> {
        let max_retries = self.config.max_retries;
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=max_retries {
            match self.build_request(request)?.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    last_status = Some(status);
                    let body = response.text().await.unwrap_or_else(|_| {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_string()
                    });
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if attempt < max_retries && is_retryable_http_error(status.as_u16(), &body) {
                        tokio::time::sleep(retry_delay_from(self.config.retry_base_delay, attempt))
                            .await;
                        continue;
                    }

                    return Err(ChatApiError::Status(status, message));
                }
                Err(error) => {
                    let transient = error.is_connect() || error.is_timeout();
                    if transient && attempt < max_retries {
                        last_error = Some(error.to_string());
                        tokio::time::sleep(retry_delay_from(self.config.retry_base_delay, attempt))
                            .await;
                        continue;
                    }
                    // Only a transient failure on the last attempt used up the retries.
                    if transient && attempt > 0 {
                        return Err(ChatApiError::RetryExhausted {
                            status: last_status,
                            last_error: Some(error.to_string()),
                        });
                    }
                    return Err(ChatApiError::Request(error));
                }
            }
        }

        Err(ChatApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Sends the request and decodes the full completion body.
    pub async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ChatApiError> {
        let response = self.send_with_retry(request).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Sends the request and returns the first choice's text.
    pub async fn complete_text(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<String, ChatApiError> {
        let completion = self.complete(request).await?;
        completion
            .first_text()
            .map(str::to_owned)
            .ok_or(ChatApiError::EmptyCompletion)
    }
}
