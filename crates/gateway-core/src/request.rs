//! Inbound request types.
//!
//! A [`UnifiedRequest`] is what the handlers hand to the translator: an
//! already-validated body tagged with the operation it targets.

use crate::anthropic::{ContentBlock, MessageContent, MessagesRequest};
use crate::error::{GatewayError, GatewayResult};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// JSON object alias
pub type JsonObject = Map<String, Value>;

/// Opaque OpenAI-style body forwarded with only `model` replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassthroughBody(JsonObject);

impl PassthroughBody {
    /// Parse raw bytes; anything but a JSON object is rejected
    pub fn from_slice(bytes: &[u8]) -> GatewayResult<Self> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Ok(Self(map)),
            _ => Err(GatewayError::invalid_request("Invalid request body")),
        }
    }

    /// Wrap an existing object
    #[must_use]
    pub fn from_object(map: JsonObject) -> Self {
        Self(map)
    }

    /// Non-empty `model` field
    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.0
            .get("model")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }

    /// `stream: true`
    #[must_use]
    pub fn is_stream(&self) -> bool {
        self.0.get("stream").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Field accessor
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Copy of the body with `model` replaced
    #[must_use]
    pub fn with_model(&self, model: &str) -> Value {
        let mut map = self.0.clone();
        map.insert("model".to_string(), Value::String(model.to_string()));
        Value::Object(map)
    }

    fn require_model(&self) -> GatewayResult<()> {
        self.model()
            .map(|_| ())
            .ok_or_else(|| GatewayError::invalid_request("Model parameter is required"))
    }

    fn require_non_empty_array(&self, key: &str, message: &str) -> GatewayResult<()> {
        match self.0.get(key) {
            Some(Value::Array(items)) if !items.is_empty() => Ok(()),
            _ => Err(GatewayError::invalid_request(message)),
        }
    }
}

/// Upstream operation targeted by a call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `/chat/completions`
    ChatCompletions,
    /// Anthropic `/messages`
    Messages,
    /// `/embeddings`
    Embeddings,
    /// Create a response (`/responses`)
    Responses,
    /// Retrieve or delete one response (`/responses/{id}`)
    Response(String),
    /// List input items of a response (`/responses/{id}/input_items`)
    ResponseInputItems(String),
}

impl Operation {
    /// Label for logs
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatCompletions => "chat_completions",
            Self::Messages => "messages",
            Self::Embeddings => "embeddings",
            Self::Responses => "responses",
            Self::Response(_) => "response",
            Self::ResponseInputItems(_) => "response_input_items",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated inbound request
#[derive(Debug, Clone, PartialEq)]
pub enum UnifiedRequest {
    /// OpenAI chat completion, forwarded as-is
    ChatCompletions(PassthroughBody),
    /// Anthropic messages call; `raw` keeps unknown fields for native providers
    Messages {
        /// Typed view used for dialect translation
        request: MessagesRequest,
        /// Body exactly as received
        raw: PassthroughBody,
    },
    /// OpenAI embeddings
    Embeddings(PassthroughBody),
    /// OpenAI responses creation
    Responses(PassthroughBody),
}

impl UnifiedRequest {
    /// Parse and validate a chat completion body
    pub fn chat_completions(bytes: &[u8]) -> GatewayResult<Self> {
        let body = PassthroughBody::from_slice(bytes)?;
        body.require_model()?;
        body.require_non_empty_array(
            "messages",
            "Messages parameter is required and must be a non-empty array",
        )?;
        Ok(Self::ChatCompletions(body))
    }

    /// Parse and validate an Anthropic messages body
    pub fn messages(bytes: &[u8]) -> GatewayResult<Self> {
        let raw = PassthroughBody::from_slice(bytes)?;
        let request: MessagesRequest = serde_json::from_value(Value::Object(raw.0.clone()))
            .map_err(|_| GatewayError::invalid_request("Invalid request body"))?;
        validate_messages(&request)?;
        Ok(Self::Messages { request, raw })
    }

    /// Parse and validate an embeddings body
    pub fn embeddings(bytes: &[u8]) -> GatewayResult<Self> {
        let body = PassthroughBody::from_slice(bytes)?;
        body.require_model()?;
        match body.get("input") {
            Some(Value::String(s)) if !s.is_empty() => {}
            Some(Value::Array(items)) if !items.is_empty() => {}
            _ => return Err(GatewayError::invalid_request("Input parameter is required")),
        }
        Ok(Self::Embeddings(body))
    }

    /// Parse and validate a responses creation body
    pub fn responses(bytes: &[u8]) -> GatewayResult<Self> {
        let body = PassthroughBody::from_slice(bytes)?;
        body.require_model()?;
        Ok(Self::Responses(body))
    }

    /// Requested logical model name
    #[must_use]
    pub fn model(&self) -> &str {
        match self {
            Self::Messages { request, .. } => &request.model,
            Self::ChatCompletions(body) | Self::Embeddings(body) | Self::Responses(body) => {
                body.model().unwrap_or_default()
            }
        }
    }

    /// Whether the client asked for a stream
    #[must_use]
    pub fn is_stream(&self) -> bool {
        match self {
            Self::Messages { request, .. } => request.stream,
            Self::ChatCompletions(body) | Self::Responses(body) => body.is_stream(),
            Self::Embeddings(_) => false,
        }
    }

    /// Operation this request targets
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::ChatCompletions(_) => Operation::ChatCompletions,
            Self::Messages { .. } => Operation::Messages,
            Self::Embeddings(_) => Operation::Embeddings,
            Self::Responses(_) => Operation::Responses,
        }
    }
}

/// Required-field and tool-reference checks for a messages request
pub fn validate_messages(request: &MessagesRequest) -> GatewayResult<()> {
    if request.model.is_empty() {
        return Err(GatewayError::invalid_request("Model parameter is required"));
    }
    if !request.max_tokens.is_some_and(|n| n > 0) {
        return Err(GatewayError::invalid_request("max_tokens parameter is required"));
    }
    if request.messages.is_empty() {
        return Err(GatewayError::invalid_request(
            "Messages parameter is required and must be a non-empty array",
        ));
    }

    let mut seen_tool_uses: HashSet<&str> = HashSet::new();
    for message in &request.messages {
        let MessageContent::Blocks(blocks) = &message.content else {
            continue;
        };
        for block in blocks {
            match block {
                ContentBlock::ToolUse { id, .. } => {
                    seen_tool_uses.insert(id.as_str());
                }
                ContentBlock::ToolResult { tool_use_id, .. } => {
                    if !seen_tool_uses.contains(tool_use_id.as_str()) {
                        return Err(GatewayError::invalid_request(format!(
                            "tool_result block references unknown tool_use_id '{tool_use_id}'"
                        )));
                    }
                }
                ContentBlock::Text { .. } | ContentBlock::Image { .. } | ContentBlock::Unsupported => {}
            }
        }
    }

    Ok(())
}
