//! Mock LLM providers for integration testing
//!
//! Wiremock servers speaking the OpenAI-compatible, Azure and Anthropic
//! dialects, plus routing-table builders that point the gateway at them.

use crate::fixtures::{openai_chat_response, openai_error_response};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Mock OpenAI-compatible API; the gateway's base URL is `{uri}/v1`
pub struct MockOpenAI {
    /// Underlying server
    pub server: MockServer,
}

impl MockOpenAI {
    /// Start the server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL as configured in the provider table
    pub fn base_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    /// Chat completion answering with `content`, for requests naming `backend_model`
    pub async fn mock_chat_completion(&self, backend_model: &str, content: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"model": backend_model})))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_chat_response(backend_model, content)))
            .mount(&self.server)
            .await;
    }

    /// Streaming chat completion with a raw SSE body
    pub async fn mock_chat_stream(&self, sse_body: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(sse_body.to_string(), "text/event-stream"))
            .mount(&self.server)
            .await;
    }

    /// Every chat call fails with `status` and an OpenAI error body
    pub async fn mock_chat_error(&self, status: u16, message: &str) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_json(openai_error_response(message)))
            .mount(&self.server)
            .await;
    }

    /// Bodies of every request received so far
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r: &Request| serde_json::from_slice(&r.body).ok())
            .collect()
    }

    /// Authorization headers of every request received so far
    pub async fn received_bearers(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.headers.get("authorization").and_then(|v| v.to_str().ok()).map(String::from))
            .collect()
    }
}

/// Mock Azure OpenAI resource
pub struct MockAzure {
    /// Underlying server
    pub server: MockServer,
}

impl MockAzure {
    /// Start the server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL as configured in the provider table
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Deployment-scoped chat completion requiring `api_key`
    pub async fn mock_deployment_chat(&self, deployment: &str, api_key: &str, content: &str) {
        Mock::given(method("POST"))
            .and(path(format!("/openai/deployments/{deployment}/chat/completions")))
            .and(query_param("api-version", "2025-01-01-preview"))
            .and(header("api-key", api_key))
            .respond_with(ResponseTemplate::new(200).set_body_json(openai_chat_response(deployment, content)))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}

/// Mock Anthropic native API
pub struct MockAnthropic {
    /// Underlying server
    pub server: MockServer,
}

impl MockAnthropic {
    /// Start the server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL as configured in the provider table
    pub fn base_url(&self) -> String {
        self.server.uri()
    }

    /// Native messages endpoint answering with `body`
    pub async fn mock_messages(&self, api_key: &str, body: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", api_key))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }
}

/// Provider table entry
pub fn provider_entry(base_url: &str, keys: &[&str]) -> Value {
    json!({"base_url": base_url, "api_keys": keys})
}

/// Model table entry with one line per `(provider, backend_model)`
pub fn model_entry(lines: &[(&str, &str)]) -> Value {
    let providers: Vec<Value> = lines
        .iter()
        .map(|(provider, model)| json!({"provider": provider, "model": model}))
        .collect();
    json!({"providers": providers})
}
