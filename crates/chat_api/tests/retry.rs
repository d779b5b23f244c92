use std::time::Duration;

use chat_api::retry::*;

#[test]
fn retry_http_status_is_retryable() {
    for status in [408, 429, 500, 502, 503, 504] {
        assert!(is_retryable_http_error(status, ""), "status {status}");
    }
    assert!(!is_retryable_http_error(400, "invalid model"));
    assert!(!is_retryable_http_error(401, ""));
}

#[test]
fn retry_http_error_pattern_is_retryable() {
    assert!(is_retryable_http_error(400, "Rate limit exceeded"));
    assert!(is_retryable_http_error(400, "provider overloaded"));
}

#[test]
fn retry_delay_is_exponential() {
    assert_eq!(retry_delay_ms(0).as_millis(), 1000);
    assert_eq!(retry_delay_ms(1).as_millis(), 2000);
    assert_eq!(retry_delay_ms(2).as_millis(), 4000);
    assert_eq!(
        retry_delay_from(Duration::from_millis(5), 3),
        Duration::from_millis(40)
    );
}
