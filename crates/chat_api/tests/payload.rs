use chat_api::{ChatCompletionRequest, ChatCompletionResponse, WireMessage};
use serde_json::json;

#[test]
fn request_serializes_without_unset_options() {
    let request = ChatCompletionRequest::new(
        "openai/gpt-4o-mini",
        vec![
            WireMessage::new("system", "be brief"),
            WireMessage::new("user", "hi"),
        ],
    );

    let value = serde_json::to_value(&request).expect("serialize request");
    assert_eq!(
        value,
        json!({
            "model": "openai/gpt-4o-mini",
            "messages": [
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "hi"}
            ],
            "stream": false
        })
    );
}

#[test]
fn request_serializes_temperature_when_set() {
    let request = ChatCompletionRequest::new("m", Vec::new()).with_temperature(0.2);
    let value = serde_json::to_value(&request).expect("serialize request");
    assert_eq!(value["temperature"], 0.2);
}

#[test]
fn response_exposes_first_choice_text() {
    let body = json!({
        "id": "gen-1",
        "model": "m",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "Done <end>"}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 10, "completion_tokens": 3, "total_tokens": 13}
    });

    let response: ChatCompletionResponse =
        serde_json::from_value(body).expect("deserialize response");
    assert_eq!(response.first_text(), Some("Done <end>"));
    assert_eq!(response.usage.map(|usage| usage.total_tokens), Some(13));
}

#[test]
fn response_without_choices_has_no_text() {
    let response: ChatCompletionResponse =
        serde_json::from_value(json!({"choices": []})).expect("deserialize response");
    assert_eq!(response.first_text(), None);

    let null_content: ChatCompletionResponse = serde_json::from_value(json!({
        "choices": [{"message": {"role": "assistant", "content": null}}]
    }))
    .expect("deserialize response");
    assert_eq!(null_content.first_text(), None);
}
