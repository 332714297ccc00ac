//! Response registry follow-ups.

use crate::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_follow_ups_reach_recording_provider() {
    let azure = MockAzure::start().await;
    Mock::given(method("POST"))
        .and(path("/openai/responses"))
        .and(query_param("api-version", "2025-03-01-preview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "resp_az", "object": "response"})))
        .expect(1)
        .mount(&azure.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/openai/responses/resp_az"))
        .and(header("api-key", "az-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "resp_az", "status": "completed"})))
        .expect(1)
        .mount(&azure.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/openai/responses/resp_az/input_items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "list", "data": [{"id": "item_1"}]})))
        .expect(1)
        .mount(&azure.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/openai/responses/resp_az"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "resp_az", "deleted": true})))
        .expect(1)
        .mount(&azure.server)
        .await;

    let gateway = TestGateway::start(
        &json!({"azure": provider_entry(&azure.base_url(), &["az-key"])}),
        &json!({"gpt-4o": model_entry(&[("azure", "gpt-4o")])}),
    )
    .await;

    let created = gateway.post_json("/v1/responses", &json!({"model": "gpt-4o", "input": "hi"})).await;
    assert_status(&created, 200);

    let fetched = gateway.get("/v1/responses/resp_az").await;
    assert_status(&fetched, 200);
    assert_eq!(json_body(fetched).await["status"], "completed");

    let items = gateway.get("/v1/responses/resp_az/input_items").await;
    assert_eq!(json_body(items).await["data"][0]["id"], "item_1");

    let deleted = gateway.delete("/v1/responses/resp_az").await;
    assert_status(&deleted, 200);

    let after = gateway.get("/v1/responses/resp_az").await;
    assert_status(&after, 404);
}

#[tokio::test]
async fn test_follow_up_survives_routing_change() {
    let upstream = MockOpenAI::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "resp_keep"})))
        .mount(&upstream.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/responses/resp_keep"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "resp_keep"})))
        .expect(1)
        .mount(&upstream.server)
        .await;

    let gateway = TestGateway::start(
        &json!({"openai": provider_entry(&upstream.base_url(), &["sk"])}),
        &json!({"gpt": model_entry(&[("openai", "gpt-4.1")])}),
    )
    .await;

    assert_status(&gateway.post_json("/v1/responses", &json!({"model": "gpt", "input": "x"})).await, 200);
    gateway.routing.replace(gateway_config::RoutingTable::default());

    assert_status(&gateway.get("/v1/responses/resp_keep").await, 200);
}

#[tokio::test]
async fn test_unknown_id_and_listing() {
    let gateway = TestGateway::start(&json!({}), &json!({})).await;

    let missing = gateway.get("/v1/responses/resp_nope").await;
    assert_status(&missing, 404);
    assert_eq!(json_body(missing).await["error"]["type"], "response_not_found");

    let listing = gateway.get("/v1/responses").await;
    assert_status(&listing, 405);
}
