use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use serviceatlas::config::Config;
use serviceatlas::health::HealthEngine;
use serviceatlas::store::Store;
use serviceatlas::web::WebServer;

async fn test_app() -> Router {
    let store = Store::in_memory().await.expect("in-memory store");
    let mut config = Config::default();
    config.self_register = false;
    config.bootstrap_config_path = "does-not-exist.yaml".to_string();
    let config = Arc::new(config);
    let health = HealthEngine::new(store.clone(), config.clone()).unwrap();

    WebServer::new(config, store, health).unwrap().router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        json!({})
    } else {
        serde_json::from_slice(&bytes).unwrap_or(json!({}))
    };
    (status, json)
}

#[tokio::test]
async fn root_health_endpoint_is_always_ok() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

/// S1 — register and discover.
#[tokio::test]
async fn register_then_discover_flow() {
    let app = test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/services",
        Some(json!({"name": "Deck", "host": "1.2.3.4", "port": 8000})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    assert!(
        regex_like_prefix(&id, "deck-"),
        "id {id} should start with 'deck-' and have an 8-hex-char suffix"
    );
    assert_eq!(body["status"], "unknown");

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/discover/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/v1/services/{id}/heartbeat"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/discover/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

/// S3 — default route injection, and no duplicate on re-register.
#[tokio::test]
async fn default_route_injection_is_not_duplicated_on_reregister() {
    let app = test_app().await;

    send(
        &app,
        Method::POST,
        "/api/v1/services",
        Some(json!({"id": "gw", "name": "gw", "host": "10.0.0.1", "port": 9000, "is_gateway": true})),
    )
    .await;

    send(
        &app,
        Method::POST,
        "/api/v1/services",
        Some(json!({"id": "svcA", "name": "svcA", "host": "10.0.0.2", "port": 9001})),
    )
    .await;

    let (status, body) = send(&app, Method::GET, "/api/v1/routes?gateway_id=gw", None).await;
    assert_eq!(status, StatusCode::OK);
    let routes = body.as_array().unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0]["path_pattern"], "/svcA/**");
    assert_eq!(routes[0]["strip_prefix"], true);
    assert_eq!(routes[0]["strip_path"], "/svcA");
    assert_eq!(routes[0]["priority"], 10);

    // Re-register svcA: still exactly one route.
    send(
        &app,
        Method::POST,
        "/api/v1/services",
        Some(json!({"id": "svcA", "name": "svcA-renamed", "host": "10.0.0.2", "port": 9002})),
    )
    .await;

    let (_, body) = send(&app, Method::GET, "/api/v1/routes?gateway_id=gw", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn unregister_returns_404_for_unknown_service() {
    let app = test_app().await;
    let (status, _) = send(&app, Method::DELETE, "/api/v1/services/does-not-exist", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn regex_like_prefix(id: &str, prefix: &str) -> bool {
    id.starts_with(prefix) && id.len() == prefix.len() + 8 && id[prefix.len()..].chars().all(|c| c.is_ascii_hexdigit())
}
