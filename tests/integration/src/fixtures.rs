//! Test fixtures and sample data for integration tests

use serde_json::{json, Value};

/// OpenAI chat completion body
pub fn openai_chat_response(model: &str, content: &str) -> Value {
    json!({
        "id": "chatcmpl-test123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": model,
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

/// OpenAI error body
pub fn openai_error_response(message: &str) -> Value {
    json!({"error": {"message": message, "type": "error", "code": null}})
}

/// Plain chat request
pub fn chat_request(model: &str, content: &str) -> Value {
    json!({"model": model, "messages": [{"role": "user", "content": content}]})
}

/// Anthropic messages request
pub fn messages_request(model: &str, content: &str, max_tokens: u32) -> Value {
    json!({
        "model": model,
        "max_tokens": max_tokens,
        "messages": [{"role": "user", "content": content}]
    })
}

/// One OpenAI stream chunk line carrying `delta`
pub fn chunk_line(delta: &Value) -> String {
    format!("data: {}\n\n", json!({"choices": [{"index": 0, "delta": delta}]}))
}

/// One OpenAI stream chunk line carrying a finish reason
pub fn finish_line(reason: &str) -> String {
    format!(
        "data: {}\n\n",
        json!({"choices": [{"index": 0, "delta": {}, "finish_reason": reason}]})
    )
}

/// Stream terminator
pub const DONE_LINE: &str = "data: [DONE]\n\n";
