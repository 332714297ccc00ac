//! # Gateway Core
//!
//! Protocol types and error handling shared by the gateway crates:
//! - OpenAI chat completion and Anthropic messages dialects
//! - Provider descriptors and model routes
//! - Validated inbound requests
//! - The gateway error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anthropic;
pub mod error;
pub mod openai;
pub mod provider;
pub mod request;

// Re-export commonly used types
pub use anthropic::{
    AnthropicMessage, AnthropicRole, BlockDelta, ContentBlock, MessageContent, MessagesRequest,
    MessagesResponse, StopReason, StreamEvent,
};
pub use error::{GatewayError, GatewayResult};
pub use openai::{ChatChunk, ChatCompletion, ChatCompletionRequest, ChatMessage, ChatRole};
pub use provider::{Credential, ModelRoute, ProviderDescriptor, ProviderKind};
pub use request::{validate_messages, JsonObject, Operation, PassthroughBody, UnifiedRequest};
