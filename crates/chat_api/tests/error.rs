use reqwest::StatusCode;

use chat_api::error::parse_error_message;
use chat_api::ChatApiError;

#[test]
fn parse_error_message_includes_string_code() {
    let body = r#"{"error":{"code":"model_not_found","message":"invalid model"}}"#;
    let message = parse_error_message(StatusCode::BAD_REQUEST, body);
    assert_eq!(message, "invalid model (model_not_found)");
}

#[test]
fn parse_error_message_accepts_numeric_code() {
    let body = r#"{"error":{"code":402,"message":"Insufficient credits"}}"#;
    let message = parse_error_message(StatusCode::PAYMENT_REQUIRED, body);
    assert_eq!(message, "Insufficient credits (402)");
}

#[test]
fn parse_error_message_falls_back_to_raw_body() {
    let message = parse_error_message(StatusCode::INTERNAL_SERVER_ERROR, "raw failure text\n");
    assert_eq!(message, "raw failure text");
}

#[test]
fn parse_error_message_uses_reason_for_empty_body() {
    let message = parse_error_message(StatusCode::SERVICE_UNAVAILABLE, "");
    assert_eq!(message, "Service Unavailable");
}

#[test]
fn status_errors_report_transience() {
    let transient = ChatApiError::Status(StatusCode::TOO_MANY_REQUESTS, "slow down".into());
    let fatal = ChatApiError::Status(StatusCode::UNAUTHORIZED, "bad key".into());

    assert!(transient.is_transient());
    assert!(!fatal.is_transient());
    assert_eq!(fatal.to_string(), "HTTP 401 Unauthorized bad key");
}
