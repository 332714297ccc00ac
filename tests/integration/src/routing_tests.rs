//! Provider selection and routing-table reloads.

use crate::*;
use gateway_config::RoutingSource;
use gateway_routing::FixedRandom;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_draws_pick_provider_then_key() {
    let first = MockOpenAI::start().await;
    let second = MockOpenAI::start().await;
    first.mock_chat_completion("m1", "first").await;
    second.mock_chat_completion("m2", "second").await;

    // provider 1, key 2; then provider 0 (single key, no second draw)
    let random = Arc::new(FixedRandom::new(vec![1, 2, 0]));
    let gateway = TestGateway::start_with(
        &json!({
            "a": provider_entry(&first.base_url(), &["a-key"]),
            "b": provider_entry(&second.base_url(), &["b-0", "b-1", "b-2"])
        }),
        &json!({"pooled": model_entry(&[("a", "m1"), ("b", "m2")])}),
        GatewayOptions {
            random: Some(random),
            ..GatewayOptions::default()
        },
    )
    .await;

    let one = gateway.post_json("/v1/chat/completions", &chat_request("pooled", "1")).await;
    assert_eq!(json_body(one).await["choices"][0]["message"]["content"], "second");
    assert_eq!(second.received_bearers().await, vec!["Bearer b-2"]);

    let two = gateway.post_json("/v1/chat/completions", &chat_request("pooled", "2")).await;
    assert_eq!(json_body(two).await["choices"][0]["message"]["content"], "first");
    assert_eq!(first.received_bearers().await, vec!["Bearer a-key"]);
}

#[tokio::test]
async fn test_unknown_model() {
    let gateway = TestGateway::start(&json!({}), &json!({})).await;

    let response = gateway.post_json("/v1/chat/completions", &chat_request("ghost", "hi")).await;

    assert_status(&response, 404);
    assert_eq!(json_body(response).await["error"]["type"], "model_not_found");
}

#[tokio::test]
async fn test_models_listing_follows_reload() {
    let upstream = MockOpenAI::start().await;
    upstream.mock_chat_completion("new-backend", "reloaded").await;

    let gateway = TestGateway::start(
        &json!({"p": provider_entry(&upstream.base_url(), &["k"])}),
        &json!({"old": model_entry(&[("p", "old-backend")])}),
    )
    .await;

    let providers = json!({"p": provider_entry(&upstream.base_url(), &["k"])}).to_string();
    let models = json!({"new": model_entry(&[("p", "new-backend")])}).to_string();
    gateway.routing.reload(&RoutingSource::inline(providers, models)).await.unwrap();

    let listing = json_body(gateway.get("/v1/models").await).await;
    let ids: Vec<&str> = listing["data"].as_array().unwrap().iter().map(|m| m["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["new"]);

    let response = gateway.post_json("/v1/chat/completions", &chat_request("new", "hi")).await;
    assert_status(&response, 200);
    let gone = gateway.post_json("/v1/chat/completions", &chat_request("old", "hi")).await;
    assert_status(&gone, 404);
}

#[tokio::test]
async fn test_failed_reload_keeps_table() {
    let gateway = TestGateway::start(
        &json!({"p": provider_entry("http://127.0.0.1:1/v1", &["k"])}),
        &json!({"kept": model_entry(&[("p", "b")])}),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("models.json");
    std::fs::write(&broken, "{ not json").unwrap();
    let source = RoutingSource::from_lookup(|name| match name {
        "MODEL_PROVIDER_CONFIG_FILE" => Some(broken.display().to_string()),
        _ => None,
    });

    assert!(gateway.routing.reload(&source).await.is_err());
    let model = gateway.get("/v1/models/kept").await;
    assert_status(&model, 200);
}
