//! Forwarding pipeline: resolve, select, build, send, shape.

use async_stream::stream;
use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use futures::StreamExt;
use gateway_core::{GatewayError, GatewayResult, Operation, ProviderDescriptor, UnifiedRequest};
use gateway_providers::{
    normalize_headers, response_id, transcode_stream, translate_completion, OutboundRequest,
    ResponseIdSniffer, ResponseTranslation, StreamTranscoder,
};
use gateway_store::ResponseRegistry;
use tracing::{debug, error, info};

use crate::state::AppState;

/// Forward a validated request to one provider and shape the answer
pub async fn forward(state: &AppState, request: UnifiedRequest) -> GatewayResult<Response> {
    let route = state.registry().resolve(request.model())?;
    let descriptor = state.selector.select(&route)?;
    let outbound = OutboundRequest::build(&request, &descriptor)?;
    let upstream = state.client.send(&outbound).await?;

    match outbound.translation {
        ResponseTranslation::OpenAiToAnthropic if outbound.stream => {
            let transcoder = StreamTranscoder::new(request.model());
            debug!(message_id = transcoder.message_id(), "Transcoding stream");
            let body = Body::from_stream(transcode_stream(upstream.bytes_stream(), transcoder));
            Ok(event_stream(StatusCode::OK, HeaderMap::new(), body))
        }
        ResponseTranslation::OpenAiToAnthropic => {
            let bytes = read_body(upstream, &descriptor).await?;
            let message = translate_completion(&bytes, request.model())?;
            Ok(Json(message).into_response())
        }
        ResponseTranslation::Passthrough if outbound.operation == Operation::Responses => {
            if outbound.stream {
                Ok(sniffed_stream(state.responses.clone(), descriptor, upstream))
            } else {
                let status = upstream.status();
                let headers = normalize_headers(upstream.headers());
                let bytes = read_body(upstream, &descriptor).await?;
                if let Some(id) = response_id(&bytes) {
                    remember(&state.responses, &id, &descriptor).await;
                }
                Ok(respond(status, headers, Body::from(bytes)))
            }
        }
        ResponseTranslation::Passthrough => Ok(passthrough(upstream, outbound.stream)),
    }
}

/// Replay a response-id call against the provider that created the response
pub async fn follow_up(state: &AppState, method: Method, operation: Operation, id: &str) -> GatewayResult<Response> {
    let entry = state
        .responses
        .lookup(id)
        .await
        .map_err(|e| GatewayError::internal(e.to_string()))?
        .ok_or_else(|| GatewayError::ResponseNotFound(id.to_string()))?;

    let outbound = OutboundRequest::follow_up(method.clone(), operation, &entry.provider)?;
    let upstream = state.client.send(&outbound).await?;

    let status = upstream.status();
    let headers = normalize_headers(upstream.headers());
    let bytes = read_body(upstream, &entry.provider).await?;

    if method == Method::DELETE {
        if let Err(e) = state.responses.forget(id).await {
            error!(response_id = id, error = %e, "Failed to remove response registry entry");
        }
    }

    Ok(respond(status, headers, Body::from(bytes)))
}

async fn read_body(upstream: reqwest::Response, descriptor: &ProviderDescriptor) -> GatewayResult<Bytes> {
    upstream
        .bytes()
        .await
        .map_err(|e| GatewayError::internal(format!("[{}] Failed to read response: {e}", descriptor.provider)))
}

async fn remember(responses: &ResponseRegistry, id: &str, descriptor: &ProviderDescriptor) {
    match responses.record(id, descriptor).await {
        Ok(()) => info!(response_id = id, provider = %descriptor.provider, "Recorded response"),
        Err(e) => error!(response_id = id, error = %e, "Failed to record response"),
    }
}

fn respond(status: StatusCode, headers: HeaderMap, body: Body) -> Response {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

fn passthrough(upstream: reqwest::Response, stream: bool) -> Response {
    let status = upstream.status();
    let headers = normalize_headers(upstream.headers());
    let body = Body::from_stream(upstream.bytes_stream());
    if stream {
        event_stream(status, headers, body)
    } else {
        respond(status, headers, body)
    }
}

/// Forward every byte while watching for the first response id
fn sniffed_stream(responses: ResponseRegistry, descriptor: ProviderDescriptor, upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers = normalize_headers(upstream.headers());
    let chunks = upstream.bytes_stream();

    let body = stream! {
        let mut sniffer = ResponseIdSniffer::new();
        let mut chunks = Box::pin(chunks);
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(bytes) => {
                    if let Some(id) = sniffer.inspect(&bytes) {
                        remember(&responses, &id, &descriptor).await;
                    }
                    yield Ok::<Bytes, reqwest::Error>(bytes);
                }
                Err(e) => {
                    error!(provider = %descriptor.provider, error = %e, "Upstream stream failed");
                    yield Err(e);
                    break;
                }
            }
        }
    };

    event_stream(status, headers, Body::from_stream(body))
}

fn event_stream(status: StatusCode, mut headers: HeaderMap, body: Body) -> Response {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    respond(status, headers, body)
}
