//! Outbound HTTP client.

use crate::translate::OutboundRequest;
use gateway_core::{GatewayError, GatewayResult};
use gateway_telemetry::upstream_span;
use reqwest::header::{HeaderMap, HeaderName, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, TRANSFER_ENCODING};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn, Instrument};

/// Headers that describe the upstream connection rather than the payload
const HOP_BY_HOP: [&str; 6] = [
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "upgrade",
];

/// Shared client for every provider call
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
}

impl ProviderClient {
    /// Create a client with the given overall request timeout
    pub fn new(timeout: Duration) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(100)
            .build()
            .map_err(|e| GatewayError::internal(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Send `request` and return the successful response.
    ///
    /// Non-2xx answers are turned into [`GatewayError::Upstream`] when the
    /// body is JSON, [`GatewayError::UpstreamUnparseable`] otherwise.
    pub async fn send(&self, request: &OutboundRequest) -> GatewayResult<Response> {
        let provider = request.provider.provider.as_str();
        let span = upstream_span!(provider, request.operation);

        async move {
            info!(
                provider,
                kind = %request.provider.kind,
                model = %request.provider.model,
                url = %request.endpoint.url,
                stream = request.stream,
                "Forwarding request"
            );

            let mut builder = self
                .client
                .request(request.method.clone(), &request.endpoint.url)
                .headers(request.endpoint.headers.clone());
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(|e| {
                error!(provider, error = %e, "Provider request failed");
                GatewayError::internal(format!("[{provider}] {e}"))
            })?;

            let status = response.status();
            if status.is_success() {
                debug!(provider, status = status.as_u16(), "Provider responded");
                return Ok(response);
            }

            let body = response.bytes().await.unwrap_or_default();
            let err = upstream_error(provider, status.as_u16(), &body);
            warn!(provider, status = status.as_u16(), error = %err, "Provider returned error");
            Err(err)
        }
        .instrument(span)
        .await
    }
}

/// Error for a non-2xx provider answer
#[must_use]
pub fn upstream_error(provider: &str, status: u16, body: &[u8]) -> GatewayError {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => {
            let message = value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("-");
            GatewayError::upstream(provider, status, message)
        }
        Err(_) => GatewayError::UpstreamUnparseable {
            provider: provider.to_string(),
            status,
        },
    }
}

/// Copy of provider response headers that is safe to forward.
///
/// Connection-level headers are dropped, and so are `content-length` and
/// `content-encoding` because the body is re-framed (and already decoded).
#[must_use]
pub fn normalize_headers(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if is_forwardable(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

fn is_forwardable(name: &HeaderName) -> bool {
    if name == CONNECTION || name == CONTENT_LENGTH || name == CONTENT_ENCODING || name == TRANSFER_ENCODING {
        return false;
    }
    !HOP_BY_HOP.contains(&name.as_str())
}
