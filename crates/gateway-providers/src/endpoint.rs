//! Outbound URL and authentication per provider kind.
//!
//! URL layouts:
//! - OpenAI-compatible: `{base}/chat/completions`, `{base}/embeddings`, `{base}/responses[/{id}[/input_items]]`
//! - Azure: `{base}/openai/deployments/{model}/chat/completions?api-version=...`, or
//!   `{base}/chat/completions?api-version=...` when the base ends in `/models`;
//!   responses live under `{base}/openai/responses`
//! - Anthropic: `{base}/v1/messages`, with the OpenAI-shaped operations under `{base}/v1/...`

use gateway_core::{GatewayError, GatewayResult, Operation, ProviderDescriptor, ProviderKind};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

/// Azure chat completions API version (deployment paths)
pub const AZURE_CHAT_API_VERSION: &str = "2025-01-01-preview";
/// Azure AI inference (`/models`) API version
pub const AZURE_INFERENCE_API_VERSION: &str = "2024-05-01-preview";
/// Azure embeddings API version
pub const AZURE_EMBEDDINGS_API_VERSION: &str = "2023-05-15";
/// Azure responses API version
pub const AZURE_RESPONSES_API_VERSION: &str = "2025-03-01-preview";
/// `anthropic-version` header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Fully qualified target of one outbound call
#[derive(Debug, Clone)]
pub struct Endpoint {
    /// Absolute URL
    pub url: String,
    /// Authentication and content headers
    pub headers: HeaderMap,
}

impl Endpoint {
    /// Build the endpoint for `operation` on `descriptor`.
    ///
    /// Depends only on the provider kind, base URL, backend model and
    /// active credential.
    pub fn resolve(descriptor: &ProviderDescriptor, operation: &Operation) -> GatewayResult<Self> {
        Ok(Self {
            url: build_url(descriptor, operation),
            headers: auth_headers(descriptor)?,
        })
    }
}

/// Outbound URL
#[must_use]
pub fn build_url(descriptor: &ProviderDescriptor, operation: &Operation) -> String {
    let base = descriptor.base_url.as_str();
    match descriptor.kind {
        ProviderKind::OpenAiCompatible => format!("{base}{}", openai_path(operation)),
        ProviderKind::Anthropic => match operation {
            Operation::Messages => format!("{base}/v1/messages"),
            other => format!("{base}/v1{}", openai_path(other)),
        },
        ProviderKind::Azure => azure_url(base, &descriptor.model, operation),
    }
}

fn openai_path(operation: &Operation) -> String {
    match operation {
        Operation::ChatCompletions | Operation::Messages => "/chat/completions".to_string(),
        Operation::Embeddings => "/embeddings".to_string(),
        Operation::Responses => "/responses".to_string(),
        Operation::Response(id) => format!("/responses/{id}"),
        Operation::ResponseInputItems(id) => format!("/responses/{id}/input_items"),
    }
}

fn azure_url(base: &str, model: &str, operation: &Operation) -> String {
    let inference = base.ends_with("/models");
    match operation {
        Operation::ChatCompletions | Operation::Messages if inference => {
            format!("{base}/chat/completions?api-version={AZURE_INFERENCE_API_VERSION}")
        }
        Operation::ChatCompletions | Operation::Messages => {
            format!("{base}/openai/deployments/{model}/chat/completions?api-version={AZURE_CHAT_API_VERSION}")
        }
        Operation::Embeddings if inference => {
            format!("{base}/embeddings?api-version={AZURE_INFERENCE_API_VERSION}")
        }
        Operation::Embeddings => {
            format!("{base}/openai/deployments/{model}/embeddings?api-version={AZURE_EMBEDDINGS_API_VERSION}")
        }
        Operation::Responses => format!("{base}/openai/responses?api-version={AZURE_RESPONSES_API_VERSION}"),
        Operation::Response(id) => {
            format!("{base}/openai/responses/{id}?api-version={AZURE_RESPONSES_API_VERSION}")
        }
        Operation::ResponseInputItems(id) => {
            format!("{base}/openai/responses/{id}/input_items?api-version={AZURE_RESPONSES_API_VERSION}")
        }
    }
}

/// Authentication headers plus `content-type: application/json`
pub fn auth_headers(descriptor: &ProviderDescriptor) -> GatewayResult<HeaderMap> {
    let key = descriptor.api_key.expose();
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    match descriptor.kind {
        ProviderKind::OpenAiCompatible => {
            headers.insert(AUTHORIZATION, secret_value(&descriptor.provider, &format!("Bearer {key}"))?);
        }
        ProviderKind::Azure => {
            headers.insert(HeaderName::from_static("api-key"), secret_value(&descriptor.provider, key)?);
        }
        ProviderKind::Anthropic => {
            headers.insert(HeaderName::from_static("x-api-key"), secret_value(&descriptor.provider, key)?);
            headers.insert(
                HeaderName::from_static("anthropic-version"),
                HeaderValue::from_static(ANTHROPIC_VERSION),
            );
        }
    }

    Ok(headers)
}

fn secret_value(provider: &str, value: &str) -> GatewayResult<HeaderValue> {
    let mut header = HeaderValue::from_str(value).map_err(|_| {
        GatewayError::Configuration(format!("API key for provider '{provider}' is not a valid header value"))
    })?;
    header.set_sensitive(true);
    Ok(header)
}
