//! # Gateway Providers
//!
//! Everything that talks to, or reshapes data from, a backend provider:
//! - Outbound URL and auth per provider kind
//! - Anthropic to OpenAI request translation
//! - Buffered and streaming OpenAI to Anthropic response translation
//! - Response-id sniffing for pass-through streams
//! - The shared HTTP client

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod endpoint;
pub mod response;
pub mod sniffer;
pub mod streaming;
pub mod translate;

pub use client::{normalize_headers, upstream_error, ProviderClient};
pub use endpoint::Endpoint;
pub use response::{fresh_message_id, fresh_tool_use_id, openai_to_anthropic, response_id, translate_completion};
pub use sniffer::ResponseIdSniffer;
pub use streaming::{transcode_stream, StreamTranscoder};
pub use translate::{anthropic_to_openai, OutboundRequest, ResponseTranslation};
