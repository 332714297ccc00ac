//! Buffered response translation and Anthropic identifiers.

use gateway_core::anthropic::{AnthropicUsage, ContentBlock, MessagesResponse, StopReason};
use gateway_core::openai::ChatCompletion;
use gateway_core::{GatewayError, GatewayResult};
use serde_json::Value;
use uuid::Uuid;

const ID_LEN: usize = 22;

fn random_suffix() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

/// Fresh `msg_` identifier
#[must_use]
pub fn fresh_message_id() -> String {
    format!("msg_{}", random_suffix())
}

/// Fresh `toolu_` identifier
#[must_use]
pub fn fresh_tool_use_id() -> String {
    format!("toolu_{}", random_suffix())
}

/// Message id derived from the provider's completion id, if it has one
#[must_use]
pub fn message_id(provider_id: Option<&str>) -> String {
    match provider_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            let stripped = id.strip_prefix("chatcmpl-").unwrap_or(id);
            format!("msg_{}", stripped.chars().take(ID_LEN).collect::<String>())
        }
        None => fresh_message_id(),
    }
}

/// Parse an OpenAI chat completion body and shape it as an Anthropic message
pub fn translate_completion(body: &[u8], model: &str) -> GatewayResult<MessagesResponse> {
    let completion: ChatCompletion = serde_json::from_slice(body)
        .map_err(|e| GatewayError::translation(format!("Unreadable provider response: {e}")))?;
    openai_to_anthropic(completion, model)
}

/// Shape a chat completion as an Anthropic message.
///
/// Only the first choice is used. `model` is the label reported to the client.
pub fn openai_to_anthropic(completion: ChatCompletion, model: &str) -> GatewayResult<MessagesResponse> {
    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GatewayError::translation("No choices in provider response"))?;

    let mut content = Vec::new();
    if let Some(text) = choice.message.content.filter(|t| !t.is_empty()) {
        content.push(ContentBlock::Text { text });
    }

    for call in choice.message.tool_calls.unwrap_or_default() {
        let input = decode_arguments(&call.function.name, &call.function.arguments)?;
        let id = if call.id.is_empty() { fresh_tool_use_id() } else { call.id };
        content.push(ContentBlock::ToolUse {
            id,
            name: call.function.name,
            input,
        });
    }

    let usage = completion.usage.unwrap_or_default();

    Ok(MessagesResponse {
        id: message_id(completion.id.as_deref()),
        object_type: "message".to_string(),
        role: gateway_core::AnthropicRole::Assistant,
        content,
        model: model.to_string(),
        stop_reason: Some(StopReason::from_finish_reason(choice.finish_reason.as_deref())),
        stop_sequence: None,
        usage: AnthropicUsage {
            input_tokens: usage.prompt_tokens,
            output_tokens: usage.completion_tokens,
        },
    })
}

/// Empty argument strings decode to `{}`
fn decode_arguments(name: &str, arguments: &str) -> GatewayResult<Value> {
    if arguments.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(arguments)
        .map_err(|e| GatewayError::translation(format!("Invalid arguments for tool '{name}': {e}")))
}

/// `id` of a buffered JSON response body, if any
#[must_use]
pub fn response_id(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    value.get("id")?.as_str().filter(|id| !id.is_empty()).map(str::to_string)
}
