//! Request translation.
//!
//! Builds the outbound call for a validated request and a selected provider:
//! endpoint, auth headers, and a body in the provider's dialect.

use crate::endpoint::Endpoint;
use gateway_core::anthropic::{AnthropicTool, AnthropicToolChoice, ContentBlock, MessageContent, MessagesRequest};
use gateway_core::openai::{
    ChatCompletionRequest, ChatContent, ChatMessage, ChatRole, ChatTool, ContentPart, FunctionDefinition,
    ImageUrl, ToolCall,
};
use gateway_core::{AnthropicRole, GatewayResult, Operation, ProviderDescriptor, ProviderKind, UnifiedRequest};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

/// How the provider's response must be shaped for the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseTranslation {
    /// Forward as received
    Passthrough,
    /// OpenAI chat completion in, Anthropic message out
    OpenAiToAnthropic,
}

/// A fully built outbound call
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    /// HTTP method
    pub method: Method,
    /// URL and headers
    pub endpoint: Endpoint,
    /// JSON body, absent for GET/DELETE
    pub body: Option<Value>,
    /// Targeted operation
    pub operation: Operation,
    /// Provider the call goes to, with its active credential
    pub provider: ProviderDescriptor,
    /// Response shaping
    pub translation: ResponseTranslation,
    /// Whether the client asked for a stream
    pub stream: bool,
}

impl OutboundRequest {
    /// Build the call for `request` on `descriptor`
    pub fn build(request: &UnifiedRequest, descriptor: &ProviderDescriptor) -> GatewayResult<Self> {
        let operation = request.operation();
        let model = descriptor.model.as_str();

        let (body, translation) = match request {
            UnifiedRequest::ChatCompletions(body) | UnifiedRequest::Embeddings(body) | UnifiedRequest::Responses(body) => {
                (body.with_model(model), ResponseTranslation::Passthrough)
            }
            UnifiedRequest::Messages { raw, .. } if descriptor.kind == ProviderKind::Anthropic => {
                (raw.with_model(model), ResponseTranslation::Passthrough)
            }
            UnifiedRequest::Messages { request, .. } => {
                let translated = anthropic_to_openai(request, model)?;
                (serde_json::to_value(translated)?, ResponseTranslation::OpenAiToAnthropic)
            }
        };

        debug!(
            provider = %descriptor.provider,
            operation = %operation,
            ?translation,
            "Built outbound request"
        );

        Ok(Self {
            method: Method::POST,
            endpoint: Endpoint::resolve(descriptor, &operation)?,
            body: Some(body),
            operation,
            provider: descriptor.clone(),
            translation,
            stream: request.is_stream(),
        })
    }

    /// Body-less follow-up call (retrieve, delete, list input items)
    pub fn follow_up(method: Method, operation: Operation, descriptor: &ProviderDescriptor) -> GatewayResult<Self> {
        Ok(Self {
            method,
            endpoint: Endpoint::resolve(descriptor, &operation)?,
            body: None,
            operation,
            provider: descriptor.clone(),
            translation: ResponseTranslation::Passthrough,
            stream: false,
        })
    }
}

/// Map an Anthropic messages request onto an OpenAI chat completion request
pub fn anthropic_to_openai(request: &MessagesRequest, backend_model: &str) -> GatewayResult<ChatCompletionRequest> {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);

    if let Some(system) = &request.system {
        messages.push(ChatMessage::text(ChatRole::System, system.flatten()));
    }

    for message in &request.messages {
        let role = match message.role {
            AnthropicRole::User => ChatRole::User,
            AnthropicRole::Assistant => ChatRole::Assistant,
        };
        match &message.content {
            MessageContent::Text(text) => messages.push(ChatMessage::text(role, text.clone())),
            MessageContent::Blocks(blocks) => convert_blocks(role, blocks, &mut messages)?,
        }
    }

    Ok(ChatCompletionRequest {
        model: backend_model.to_string(),
        messages,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        top_p: request.top_p,
        stop: request.stop_sequences.clone(),
        stream: request.stream.then_some(true),
        tools: request.tools.as_deref().map(convert_tools),
        tool_choice: request.tool_choice.as_ref().map(convert_tool_choice),
        user: request.metadata.as_ref().and_then(|m| m.user_id.clone()),
    })
}

/// Appends one or more messages for a block list.
///
/// Text and image blocks accumulate into one message; `tool_use` blocks
/// become `tool_calls` on it; each `tool_result` becomes its own `tool`
/// message, flushing any parts gathered before it so order is kept.
fn convert_blocks(role: ChatRole, blocks: &[ContentBlock], out: &mut Vec<ChatMessage>) -> GatewayResult<()> {
    let mut parts: Vec<ContentPart> = Vec::new();
    let mut tool_calls: Vec<ToolCall> = Vec::new();

    for block in blocks {
        match block {
            ContentBlock::Text { text } => parts.push(ContentPart::Text { text: text.clone() }),
            ContentBlock::Image { source } => {
                if let Some(url) = source.to_url() {
                    parts.push(ContentPart::ImageUrl { image_url: ImageUrl { url } });
                }
            }
            ContentBlock::ToolUse { id, name, input } => {
                tool_calls.push(ToolCall::function(id, name, serde_json::to_string(input)?));
            }
            ContentBlock::ToolResult { tool_use_id, content, .. } => {
                flush(role, &mut parts, &mut tool_calls, out);
                let text = content.as_ref().map(|c| c.flatten()).unwrap_or_default();
                out.push(ChatMessage::tool_result(tool_use_id, text));
            }
            ContentBlock::Unsupported => {}
        }
    }

    flush(role, &mut parts, &mut tool_calls, out);
    Ok(())
}

fn flush(role: ChatRole, parts: &mut Vec<ContentPart>, tool_calls: &mut Vec<ToolCall>, out: &mut Vec<ChatMessage>) {
    if parts.is_empty() && tool_calls.is_empty() {
        return;
    }
    let content = collapse(std::mem::take(parts));
    let tool_calls = std::mem::take(tool_calls);
    out.push(ChatMessage {
        role,
        content,
        tool_calls: (!tool_calls.is_empty()).then_some(tool_calls),
        tool_call_id: None,
    });
}

/// A lone text part collapses to a plain string
fn collapse(mut parts: Vec<ContentPart>) -> Option<ChatContent> {
    match parts.len() {
        0 => None,
        1 if matches!(parts[0], ContentPart::Text { .. }) => match parts.pop() {
            Some(ContentPart::Text { text }) => Some(ChatContent::Text(text)),
            other => other.map(|p| ChatContent::Parts(vec![p])),
        },
        _ => Some(ChatContent::Parts(parts)),
    }
}

fn convert_tools(tools: &[AnthropicTool]) -> Vec<ChatTool> {
    tools
        .iter()
        .map(|tool| ChatTool {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.input_schema.clone(),
            },
        })
        .collect()
}

fn convert_tool_choice(choice: &AnthropicToolChoice) -> Value {
    match choice {
        AnthropicToolChoice::Auto => json!("auto"),
        AnthropicToolChoice::Any => json!("required"),
        AnthropicToolChoice::None => json!("none"),
        AnthropicToolChoice::Tool { name } => json!({"type": "function", "function": {"name": name}}),
    }
}
