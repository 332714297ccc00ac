//! Streaming over a live connection.

use crate::*;
use serde_json::json;

async fn gateway_for(upstream: &MockOpenAI) -> TestGateway {
    TestGateway::start(
        &json!({"openai": provider_entry(&upstream.base_url(), &["sk-oa"])}),
        &json!({"claude-haiku": model_entry(&[("openai", "gpt-4o-mini")])}),
    )
    .await
}

fn stream_request() -> serde_json::Value {
    json!({
        "model": "claude-haiku",
        "max_tokens": 64,
        "stream": true,
        "messages": [{"role": "user", "content": "hi"}]
    })
}

#[tokio::test]
async fn test_text_stream_event_sequence() {
    let upstream = MockOpenAI::start().await;
    let body = [chunk_line(&json!({"content": "Hello"})), finish_line("stop"), DONE_LINE.to_string()].concat();
    upstream.mock_chat_stream(&body).await;
    let gateway = gateway_for(&upstream).await;

    let text = gateway.post_streaming("/v1/messages", &stream_request()).await;

    assert_eq!(
        sse_event_names(&text),
        vec![
            "message_start",
            "content_block_start",
            "content_block_delta",
            "content_block_stop",
            "message_stop"
        ]
    );
    let payloads = sse_payloads(&text);
    assert!(payloads[0]["message"]["id"].as_str().unwrap().starts_with("msg_"));
    assert_eq!(payloads[0]["message"]["model"], "claude-haiku");
    assert_eq!(payloads[1]["index"], 0);
    assert_eq!(payloads[2]["delta"], json!({"type": "text_delta", "text": "Hello"}));
    assert_eq!(payloads[3]["index"], 0);
}

#[tokio::test]
async fn test_tool_call_stream() {
    let upstream = MockOpenAI::start().await;
    let body = [
        chunk_line(&json!({"content": "Checking"})),
        chunk_line(&json!({"tool_calls": [
            {"index": 0, "id": "call_a", "type": "function", "function": {"name": "weather", "arguments": "{\"city\":\"Oslo\"}"}},
            {"index": 1, "id": "call_b", "type": "function", "function": {"name": "time", "arguments": "{\"tz\":\"CET\"}"}}
        ]})),
        finish_line("tool_calls"),
        DONE_LINE.to_string(),
    ]
    .concat();
    upstream.mock_chat_stream(&body).await;
    let gateway = gateway_for(&upstream).await;

    let text = gateway.post_streaming("/v1/messages", &stream_request()).await;
    let payloads = sse_payloads(&text);

    let starts: Vec<u64> = payloads
        .iter()
        .filter(|p| p["type"] == "content_block_start")
        .map(|p| p["index"].as_u64().unwrap())
        .collect();
    let stops: Vec<u64> = payloads
        .iter()
        .filter(|p| p["type"] == "content_block_stop")
        .map(|p| p["index"].as_u64().unwrap())
        .collect();
    assert_eq!(starts, vec![0, 1, 2]);
    // the text block closes on the finish signal, after the tool blocks
    assert_eq!(stops, vec![1, 2, 0]);

    let tool_json: Vec<&str> = payloads
        .iter()
        .filter(|p| p["delta"]["type"] == "input_json_delta")
        .map(|p| p["delta"]["partial_json"].as_str().unwrap())
        .collect();
    assert_eq!(tool_json, vec!["{\"city\":\"Oslo\"}", "{\"tz\":\"CET\"}"]);
    assert_eq!(sse_event_names(&text).last().map(String::as_str), Some("message_stop"));
}

#[tokio::test]
async fn test_truncated_final_line_is_recovered() {
    let upstream = MockOpenAI::start().await;
    let body = format!(
        "{}data: {}",
        chunk_line(&json!({"content": "Hel"})),
        json!({"choices": [{"index": 0, "delta": {"content": "lo"}}]})
    );
    upstream.mock_chat_stream(&body).await;
    let gateway = gateway_for(&upstream).await;

    let text = gateway.post_streaming("/v1/messages", &stream_request()).await;
    let deltas: Vec<String> = sse_payloads(&text)
        .iter()
        .filter(|p| p["delta"]["type"] == "text_delta")
        .map(|p| p["delta"]["text"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(deltas, vec!["Hel", "lo"]);
    assert_eq!(
        sse_event_names(&text)[sse_event_names(&text).len() - 2..],
        ["content_block_stop".to_string(), "message_stop".to_string()]
    );
}

#[tokio::test]
async fn test_malformed_chunk_is_skipped() {
    let upstream = MockOpenAI::start().await;
    let body = [
        chunk_line(&json!({"content": "a"})),
        "data: {not json}\n\n".to_string(),
        chunk_line(&json!({"content": "b"})),
        DONE_LINE.to_string(),
    ]
    .concat();
    upstream.mock_chat_stream(&body).await;
    let gateway = gateway_for(&upstream).await;

    let text = gateway.post_streaming("/v1/messages", &stream_request()).await;
    let names = sse_event_names(&text);

    assert_eq!(names.iter().filter(|n| *n == "content_block_delta").count(), 2);
    assert_eq!(names.iter().filter(|n| *n == "content_block_start").count(), 1);
    assert_eq!(names.last().map(String::as_str), Some("message_stop"));
}

#[tokio::test]
async fn test_chat_stream_passes_through() {
    let upstream = MockOpenAI::start().await;
    let body = [chunk_line(&json!({"content": "raw"})), DONE_LINE.to_string()].concat();
    upstream.mock_chat_stream(&body).await;
    let gateway = gateway_for(&upstream).await;

    let text = gateway
        .post_streaming(
            "/v1/chat/completions",
            &json!({"model": "claude-haiku", "stream": true, "messages": [{"role": "user", "content": "hi"}]}),
        )
        .await;

    assert_eq!(text, body);
}
