//! Protocol scenarios over a live gateway.

use crate::*;
use serde_json::json;

#[tokio::test]
async fn test_single_provider_gets_backend_model() {
    let upstream = MockOpenAI::start().await;
    upstream.mock_chat_completion("deepseek-chat", "hi there").await;

    let gateway = TestGateway::start(
        &json!({"deepseek": provider_entry(&upstream.base_url(), &["sk-ds"])}),
        &json!({"X": model_entry(&[("deepseek", "deepseek-chat")])}),
    )
    .await;

    let response = gateway.post_json("/v1/chat/completions", &chat_request("X", "hi")).await;
    assert_status(&response, 200);
    assert_eq!(json_body(response).await["choices"][0]["message"]["content"], "hi there");

    let bodies = upstream.received_bodies().await;
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], "deepseek-chat");
    assert_eq!(bodies[0]["messages"], json!([{"role": "user", "content": "hi"}]));
    assert_eq!(upstream.received_bearers().await, vec!["Bearer sk-ds"]);
}

#[tokio::test]
async fn test_messages_without_max_tokens_is_rejected() {
    let upstream = MockOpenAI::start().await;
    let gateway = TestGateway::start(
        &json!({"deepseek": provider_entry(&upstream.base_url(), &["sk-ds"])}),
        &json!({"claude": model_entry(&[("deepseek", "deepseek-chat")])}),
    )
    .await;

    let response = gateway
        .post_json(
            "/v1/messages",
            &json!({"model": "claude", "messages": [{"role": "user", "content": "hi"}]}),
        )
        .await;

    assert_status(&response, 400);
    let body = json_body(response).await;
    assert_eq!(body["type"], "error");
    assert_eq!(body["error"]["message"], "max_tokens parameter is required");
    assert!(upstream.received_bodies().await.is_empty());
}

#[tokio::test]
async fn test_composite_model_name() {
    let upstream = MockOpenAI::start().await;
    upstream.mock_chat_completion("gpt-x", "composite").await;

    let gateway = TestGateway::start(
        &json!({"myprovider": provider_entry(&upstream.base_url(), &["sk-mine"])}),
        &json!({}),
    )
    .await;

    let response = gateway
        .post_json("/v1/chat/completions", &chat_request("gpt-x#myprovider", "hi"))
        .await;

    assert_status(&response, 200);
    assert_eq!(upstream.received_bodies().await[0]["model"], "gpt-x");
    assert_eq!(upstream.received_bearers().await, vec!["Bearer sk-mine"]);
}

#[tokio::test]
async fn test_upstream_rate_limit_propagates() {
    let upstream = MockOpenAI::start().await;
    upstream.mock_chat_error(429, "rate limited").await;

    let gateway = TestGateway::start(
        &json!({"groq": provider_entry(&upstream.base_url(), &["sk-groq"])}),
        &json!({"llama": model_entry(&[("groq", "llama-3.1-70b")])}),
    )
    .await;

    let response = gateway.post_json("/v1/chat/completions", &chat_request("llama", "hi")).await;

    assert_status(&response, 429);
    let message = json_body(response).await["error"]["message"].as_str().unwrap().to_string();
    assert!(message.contains("groq"));
    assert!(message.contains("rate limited"));
    assert!(!message.contains("sk-groq"));
}

#[tokio::test]
async fn test_anthropic_client_on_azure_backend() {
    let azure = MockAzure::start().await;
    azure.mock_deployment_chat("gpt-4o", "az-key", "from azure").await;

    let gateway = TestGateway::start(
        &json!({"azure": provider_entry(&azure.base_url(), &["az-key"])}),
        &json!({"claude-3-5-sonnet": model_entry(&[("azure", "gpt-4o")])}),
    )
    .await;

    let response = gateway
        .post_json("/v1/messages", &messages_request("claude-3-5-sonnet", "hi", 32))
        .await;

    assert_status(&response, 200);
    let body = json_body(response).await;
    assert_eq!(body["type"], "message");
    assert_eq!(body["role"], "assistant");
    assert_eq!(body["model"], "claude-3-5-sonnet");
    assert_eq!(body["content"], json!([{"type": "text", "text": "from azure"}]));
    assert_eq!(body["usage"]["input_tokens"], 10);
    assert_eq!(body["usage"]["output_tokens"], 5);
    assert_eq!(body["id"], "msg_test123");
}

#[tokio::test]
async fn test_anthropic_backend_passthrough() {
    let anthropic = MockAnthropic::start().await;
    anthropic
        .mock_messages(
            "ant-key",
            json!({
                "id": "msg_01native",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "native answer"}],
                "model": "claude-3-5-sonnet-20241022",
                "stop_reason": "end_turn",
                "stop_sequence": null,
                "usage": {"input_tokens": 3, "output_tokens": 2}
            }),
        )
        .await;

    let gateway = TestGateway::start(
        &json!({"anthropic": provider_entry(&anthropic.base_url(), &["ant-key"])}),
        &json!({"sonnet": model_entry(&[("anthropic", "claude-3-5-sonnet-20241022")])}),
    )
    .await;

    let response = gateway.post_json("/v1/messages", &messages_request("sonnet", "hi", 16)).await;

    assert_status(&response, 200);
    let body = json_body(response).await;
    assert_eq!(body["id"], "msg_01native");
    assert_eq!(body["content"][0]["text"], "native answer");
}

#[tokio::test]
async fn test_service_key_enforced() {
    let upstream = MockOpenAI::start().await;
    upstream.mock_chat_completion("m", "ok").await;

    let gateway = TestGateway::start_with(
        &json!({"p": provider_entry(&upstream.base_url(), &["k"])}),
        &json!({"m": model_entry(&[("p", "m")])}),
        GatewayOptions {
            service_key: Some("sk-gateway".into()),
            ..GatewayOptions::default()
        },
    )
    .await;

    let denied = gateway.post_json("/v1/chat/completions", &chat_request("m", "hi")).await;
    assert_status(&denied, 401);

    let allowed = gateway
        .post_json_with_headers(
            "/v1/chat/completions",
            &chat_request("m", "hi"),
            &[("authorization", "Bearer sk-gateway")],
        )
        .await;
    assert_status(&allowed, 200);

    let health = gateway.get("/health").await;
    assert_status(&health, 200);
}

#[tokio::test]
async fn test_preflight() {
    let gateway = TestGateway::start(&json!({}), &json!({})).await;

    let response = gateway
        .client
        .request(reqwest::Method::OPTIONS, gateway.url("/v1/chat/completions"))
        .send()
        .await
        .unwrap();

    assert_status(&response, 204);
    assert_eq!(response.headers()["access-control-allow-origin"], "*");
    assert_eq!(
        response.headers()["access-control-allow-methods"],
        "GET, POST, DELETE, OPTIONS"
    );
}
