//! Anthropic Messages dialect.
//!
//! Request, response and streaming event shapes for `/v1/messages`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Messages API request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesRequest {
    /// Logical model name
    #[serde(default)]
    pub model: String,

    /// Conversation turns
    #[serde(default)]
    pub messages: Vec<AnthropicMessage>,

    /// Required by the Anthropic protocol; validated rather than defaulted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// System prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<SystemPrompt>,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,

    /// Top-k sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,

    /// Custom stop sequences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,

    /// Stream the response as SSE
    #[serde(default)]
    pub stream: bool,

    /// Tool definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AnthropicTool>>,

    /// Tool choice
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<AnthropicToolChoice>,

    /// Request metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<AnthropicMetadata>,
}

/// Speaker of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnthropicRole {
    /// End user
    User,
    /// Model
    Assistant,
}

/// One conversation turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicMessage {
    /// Speaker
    pub role: AnthropicRole,
    /// Plain text or ordered blocks
    pub content: MessageContent,
}

/// Message content: a bare string or a block list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /// Plain text
    Text(String),
    /// Ordered content blocks
    Blocks(Vec<ContentBlock>),
}

/// System prompt: a bare string or a block list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SystemPrompt {
    /// Plain text
    Text(String),
    /// Content blocks; only `text` blocks contribute
    Blocks(Vec<ContentBlock>),
}

impl SystemPrompt {
    /// Flatten to a single string, joining text blocks with newlines
    #[must_use]
    pub fn flatten(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => join_text_blocks(blocks),
        }
    }
}

/// Tagged unit of message content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text
    Text {
        /// The text
        text: String,
    },
    /// Image
    Image {
        /// Image payload
        source: ImageSource,
    },
    /// Tool invocation issued by the model
    ToolUse {
        /// Invocation id
        id: String,
        /// Tool name
        name: String,
        /// Structured arguments
        input: Value,
    },
    /// Result of a tool invocation, supplied by the client
    ToolResult {
        /// Id of the matching `tool_use` block
        tool_use_id: String,
        /// Result payload
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<ToolResultContent>,
        /// Whether the tool failed
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_error: Option<bool>,
    },
    /// Any block type this gateway does not translate
    #[serde(other)]
    Unsupported,
}

impl ContentBlock {
    /// Convenience constructor for a text block
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Image payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    /// "base64" or "url"
    #[serde(rename = "type")]
    pub source_type: String,
    /// MIME type for base64 payloads
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    /// Base64 data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Remote URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ImageSource {
    /// URL form usable by OpenAI `image_url` parts
    #[must_use]
    pub fn to_url(&self) -> Option<String> {
        match (&self.url, &self.media_type, &self.data) {
            (Some(url), _, _) => Some(url.clone()),
            (None, Some(media_type), Some(data)) => Some(format!("data:{media_type};base64,{data}")),
            _ => None,
        }
    }
}

/// Tool result payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    /// Plain text
    Text(String),
    /// Nested blocks; text blocks are concatenated
    Blocks(Vec<ContentBlock>),
}

impl ToolResultContent {
    /// Flatten to text
    #[must_use]
    pub fn flatten(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Blocks(blocks) => join_text_blocks(blocks),
        }
    }
}

fn join_text_blocks(blocks: &[ContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Tool definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicTool {
    /// Tool name
    pub name: String,
    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the input
    #[serde(default)]
    pub input_schema: Value,
}

/// Tool choice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicToolChoice {
    /// Model decides
    Auto,
    /// Model must use some tool
    Any,
    /// Model must use the named tool
    Tool {
        /// Tool name
        name: String,
    },
    /// Tools disabled
    None,
}

/// Request metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthropicMetadata {
    /// Opaque end-user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Natural end of turn
    EndTurn,
    /// Token limit reached
    MaxTokens,
    /// Stop sequence hit (also used for filtered content)
    StopSequence,
    /// Model requested a tool
    ToolUse,
}

impl StopReason {
    /// Map an OpenAI `finish_reason`
    #[must_use]
    pub fn from_finish_reason(reason: Option<&str>) -> Self {
        match reason {
            Some("length") => Self::MaxTokens,
            Some("tool_calls") => Self::ToolUse,
            Some("content_filter") => Self::StopSequence,
            _ => Self::EndTurn,
        }
    }
}

/// Token usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnthropicUsage {
    /// Prompt tokens
    pub input_tokens: u32,
    /// Completion tokens
    pub output_tokens: u32,
}

/// Messages API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessagesResponse {
    /// Response id (`msg_...`)
    pub id: String,
    /// Always "message"
    #[serde(rename = "type")]
    pub object_type: String,
    /// Always assistant
    pub role: AnthropicRole,
    /// Emitted blocks (only `text` and `tool_use`)
    pub content: Vec<ContentBlock>,
    /// Model label
    pub model: String,
    /// Stop reason; null while streaming
    pub stop_reason: Option<StopReason>,
    /// Matched stop sequence
    pub stop_sequence: Option<String>,
    /// Token usage
    pub usage: AnthropicUsage,
}

impl MessagesResponse {
    /// Empty assistant message used as the `message_start` payload
    pub fn empty(id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            object_type: "message".to_string(),
            role: AnthropicRole::Assistant,
            content: Vec::new(),
            model: model.into(),
            stop_reason: None,
            stop_sequence: None,
            usage: AnthropicUsage::default(),
        }
    }
}

/// Delta payload of a `content_block_delta` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockDelta {
    /// Text appended to a text block
    TextDelta {
        /// Appended text
        text: String,
    },
    /// JSON fragment appended to a tool_use input
    InputJsonDelta {
        /// JSON text
        partial_json: String,
    },
}

/// Anthropic streaming event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// First event of every stream
    MessageStart {
        /// Empty message shell
        message: MessagesResponse,
    },
    /// Opens a content block
    ContentBlockStart {
        /// Block index
        index: u32,
        /// Seed block
        content_block: ContentBlock,
    },
    /// Appends to an open block
    ContentBlockDelta {
        /// Block index
        index: u32,
        /// Appended payload
        delta: BlockDelta,
    },
    /// Closes a block
    ContentBlockStop {
        /// Block index
        index: u32,
    },
    /// Last event of every stream
    MessageStop,
}

impl StreamEvent {
    /// SSE `event:` name
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::MessageStart { .. } => "message_start",
            Self::ContentBlockStart { .. } => "content_block_start",
            Self::ContentBlockDelta { .. } => "content_block_delta",
            Self::ContentBlockStop { .. } => "content_block_stop",
            Self::MessageStop => "message_stop",
        }
    }

    /// Render as one SSE frame (`event:` + `data:` + blank line)
    #[must_use]
    pub fn to_sse_frame(&self) -> String {
        let data = serde_json::to_string(self).unwrap_or_default();
        format!("event: {}\ndata: {data}\n\n", self.event_name())
    }
}
