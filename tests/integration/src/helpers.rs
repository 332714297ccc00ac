//! Test helper utilities for integration tests

use futures::StreamExt;
use gateway_config::{ConfigHandle, RoutingTable};
use gateway_routing::RandomSource;
use gateway_server::{AppState, Server, ShutdownHandle};
use gateway_telemetry::{init_logging, LoggingConfig};
use reqwest::{Client, Response};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::{Arc, Once};
use std::time::Duration;
use tokio::net::TcpListener;

static TRACING: Once = Once::new();

/// Initialize logging for tests when `TEST_LOG` is set
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            let _ = init_logging(&LoggingConfig::new().with_level("debug"));
        }
    });
}

/// Options for [`TestGateway::start_with`]
#[derive(Default)]
pub struct GatewayOptions {
    /// Front-door key
    pub service_key: Option<String>,
    /// Deterministic provider draw
    pub random: Option<Arc<dyn RandomSource>>,
}

/// A gateway listening on a local port
pub struct TestGateway {
    /// Listening address
    pub addr: SocketAddr,
    /// HTTP client for making requests
    pub client: Client,
    /// Routing handle shared with the server
    pub routing: ConfigHandle,
    shutdown: ShutdownHandle,
}

impl TestGateway {
    /// Start with the given provider and model tables
    pub async fn start(providers: &Value, models: &Value) -> Self {
        Self::start_with(providers, models, GatewayOptions::default()).await
    }

    /// Start with explicit options
    pub async fn start_with(providers: &Value, models: &Value, options: GatewayOptions) -> Self {
        init_tracing();

        let table = RoutingTable::from_json(&providers.to_string(), &models.to_string())
            .expect("valid routing tables");
        let routing = ConfigHandle::new(table);

        let mut builder = AppState::builder()
            .routing(routing.clone())
            .service_key(options.service_key);
        if let Some(random) = options.random {
            builder = builder.random(random);
        }
        let state = builder.build().expect("valid state");

        let server = Server::new(state);
        let shutdown = server.shutdown_handle();
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");
        tokio::spawn(server.serve(listener));

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create client");

        Self {
            addr,
            client,
            routing,
            shutdown,
        }
    }

    /// Get the full URL for a path
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.expect("Request failed")
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Response {
        self.client.delete(self.url(path)).send().await.expect("Request failed")
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, path: &str, body: &Value) -> Response {
        self.post_json_with_headers(path, body, &[]).await
    }

    /// Make a POST request with JSON body and headers
    pub async fn post_json_with_headers(&self, path: &str, body: &Value, headers: &[(&str, &str)]) -> Response {
        let mut builder = self.client.post(self.url(path)).json(body);
        for (key, value) in headers {
            builder = builder.header(*key, *value);
        }
        builder.send().await.expect("Request failed")
    }

    /// POST and collect the streamed body as text
    pub async fn post_streaming(&self, path: &str, body: &Value) -> String {
        let response = self.post_json(path, body).await;
        assert_status(&response, 200);

        let mut text = String::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let bytes = chunk.expect("stream chunk");
            text.push_str(std::str::from_utf8(&bytes).expect("utf-8 chunk"));
        }
        text
    }

    /// Stop the server
    pub fn shutdown(&self) {
        self.shutdown.trigger("test finished");
    }
}

impl Drop for TestGateway {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Parse response body as JSON
pub async fn json_body(response: Response) -> Value {
    response.json().await.expect("Failed to parse JSON")
}

/// Assert that a response has the expected status code
pub fn assert_status(response: &Response, expected: u16) {
    assert_eq!(
        response.status().as_u16(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// `event:` names of an SSE body, in order
pub fn sse_event_names(body: &str) -> Vec<String> {
    body.lines()
        .filter_map(|line| line.strip_prefix("event: "))
        .map(String::from)
        .collect()
}

/// `data:` payloads of an SSE body, parsed as JSON
pub fn sse_payloads(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data: "))
        .filter_map(|data| serde_json::from_str(data).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_gateway_health() {
        let gateway = TestGateway::start(&json!({}), &json!({})).await;

        let response = gateway.get("/health").await;
        assert_status(&response, 200);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[test]
    fn test_sse_helpers() {
        let body = "event: message_start\ndata: {\"a\":1}\n\nevent: message_stop\ndata: {\"b\":2}\n\n";
        assert_eq!(sse_event_names(body), vec!["message_start", "message_stop"]);
        assert_eq!(sse_payloads(body)[1]["b"], 2);
    }
}
