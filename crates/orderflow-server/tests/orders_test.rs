//! Tests de los endpoints de orders.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use helpers::{TestApp, client, order_created_at, sample_order, wait_until};
use orderflow_core::Order;

// === GET /order/{id} ===

#[tokio::test]
async fn get_existing_order_returns_json() {
    let app = TestApp::with_orders(vec![sample_order("b563feb7b2b84b6test")]);

    let response = app.client.get("/order/b563feb7b2b84b6test").await;

    response
        .assert_status(StatusCode::OK)
        .assert_content_type_contains("application/json");
    let order: Order = response.json();
    assert_eq!(order, sample_order("b563feb7b2b84b6test"));
}

#[tokio::test]
async fn get_fills_cache_in_background() {
    let app = TestApp::with_orders(vec![sample_order("a")]);
    assert!(!app.cache.contains("a"));

    app.client.get("/order/a").await.assert_status(StatusCode::OK);
    app.service.flush().await;

    assert!(app.cache.contains("a"));
}

#[tokio::test]
async fn get_missing_order_returns_404() {
    let app = TestApp::new();

    let response = app.client.get("/order/missing").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Not Found");
    assert!(body["message"].as_str().unwrap().contains("missing"));
    assert!(!app.cache.contains("missing"));
}

#[tokio::test]
async fn get_blank_id_returns_400() {
    let response = client().get("/order/%20%20").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_overlong_id_returns_400() {
    let id = "x".repeat(200);

    let response = client().get(&format!("/order/{id}")).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

// === GET /orders ===

#[tokio::test]
async fn list_orders_newest_first_with_limit() {
    let app = TestApp::with_orders(vec![
        order_created_at("old", 1_600_000_000),
        order_created_at("new", 1_700_000_000),
        order_created_at("mid", 1_650_000_000),
    ]);

    let orders: Vec<Order> = app.client.get("/orders?limit=2").await.json();

    let ids: Vec<&str> = orders.iter().map(|o| o.order_uid.as_str()).collect();
    assert_eq!(ids, vec!["new", "mid"]);
}

#[tokio::test]
async fn list_orders_defaults_limit() {
    let orders: Vec<Order> = (0..15)
        .map(|i| order_created_at(&format!("o{i}"), 1_600_000_000 + i))
        .collect();
    let app = TestApp::with_orders(orders);

    let listed: Vec<Order> = app.client.get("/orders").await.json();

    assert_eq!(listed.len(), 10);
}

// === POST /orders ===

#[tokio::test]
async fn post_publishes_raw_body() {
    let app = TestApp::new();
    let payload = serde_json::to_vec(&sample_order("posted")).unwrap();

    let response = app.client.post_json("/orders", payload.clone()).await;

    response.assert_status(StatusCode::ACCEPTED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["offset"], 0);
    assert_eq!(app.next_published().await, Some(payload));
}

#[tokio::test]
async fn post_empty_body_returns_400() {
    let response = TestApp::new().client.post_json("/orders", Vec::new()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn post_after_transport_closed_returns_503() {
    // client() drops the consumer side
    let response = client().post_json("/orders", b"{}".to_vec()).await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

// === End to end ===

#[tokio::test]
async fn posted_order_becomes_readable() {
    let mut app = TestApp::new();
    let pipeline = app.start_pipeline();

    let payload = serde_json::to_vec(&sample_order("e2e")).unwrap();
    app.client
        .post_json("/orders", payload)
        .await
        .assert_status(StatusCode::ACCEPTED);

    wait_until(|| pipeline.stats().processed == 1).await;

    let response = app.client.get("/order/e2e").await;
    response.assert_status(StatusCode::OK);

    let stats = pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
    assert_eq!(stats.consumed, 1);
}

#[tokio::test]
async fn invalid_order_is_dead_lettered() {
    let mut app = TestApp::new();
    let pipeline = app.start_pipeline();

    let mut order = sample_order("bad-email");
    order.delivery.email = "not-an-email".to_string();
    app.client
        .post_json("/orders", serde_json::to_vec(&order).unwrap())
        .await
        .assert_status(StatusCode::ACCEPTED);
    app.client
        .post_json("/orders", b"not json".to_vec())
        .await
        .assert_status(StatusCode::ACCEPTED);

    let dead_letters = app.dead_letters.clone();
    wait_until(|| dead_letters.len() == 2).await;

    let body: serde_json::Value = app.client.get("/dead-letters").await.json();
    assert_eq!(body["retained"], true);
    assert_eq!(body["count"], 2);
    let reasons: Vec<&str> = body["letters"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["reason"].as_str().unwrap())
        .collect();
    assert!(reasons.contains(&"invalid"));
    assert!(reasons.contains(&"undecodable"));

    app.client
        .get("/order/bad-email")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    pipeline.shutdown(Duration::from_secs(5)).await.unwrap();
}
