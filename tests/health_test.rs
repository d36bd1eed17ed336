use std::sync::Arc;

use serviceatlas::config::Config;
use serviceatlas::health::HealthEngine;
use serviceatlas::models::{ServiceCreate, ServiceStatus};
use serviceatlas::registry;
use serviceatlas::store::Store;

async fn test_store() -> Store {
    Store::in_memory().await.expect("in-memory store")
}

fn create(id: &str) -> ServiceCreate {
    ServiceCreate {
        id: Some(id.to_string()),
        name: id.to_string(),
        host: "127.0.0.1".to_string(),
        port: 8080,
        protocol: None,
        health_check_path: None,
        is_gateway: Some(false),
        base_path: None,
        service_meta: None,
    }
}

/// S6 — heartbeat timeout.
#[tokio::test]
async fn stale_heartbeat_is_marked_unhealthy_and_recovers_on_next_heartbeat() {
    let store = test_store().await;
    let service = registry::register_service(&store, create("svc")).await.unwrap();

    let mut config = Config::default();
    config.heartbeat_timeout = 60;
    let engine = HealthEngine::new(store.clone(), Arc::new(config)).unwrap();

    let mut stale = service.clone();
    stale.last_heartbeat = Some(chrono::Utc::now() - chrono::Duration::seconds(120));
    store.save_service(&stale).await.unwrap();

    engine.run_heartbeat_sweep().await.unwrap();

    let swept = store.get_service(&service.id).await.unwrap().unwrap();
    assert_eq!(swept.status, ServiceStatus::Unhealthy);

    let recovered = registry::heartbeat(&store, &service.id).await.unwrap().unwrap();
    assert_eq!(recovered.status, ServiceStatus::Healthy);
}

/// S2 — active-probe failure threshold: a service flips to `unhealthy` only
/// once consecutive failures reach `unhealthy_threshold`, not before.
#[tokio::test]
async fn repeated_probe_failures_flip_to_unhealthy_at_the_threshold() {
    let store = test_store().await;
    let service = registry::register_service(&store, create("flaky")).await.unwrap();

    let mut config = Config::default();
    config.unhealthy_threshold = 3;
    let engine = HealthEngine::new(store.clone(), Arc::new(config)).unwrap();

    for n in 1..=2 {
        let current = store.get_service(&service.id).await.unwrap().unwrap();
        engine.apply_probe_result(current, false).await.unwrap();
        let after = store.get_service(&service.id).await.unwrap().unwrap();
        assert_eq!(after.consecutive_failures, n);
        assert_eq!(after.status, ServiceStatus::Unknown, "must not flip before the threshold");
    }

    let current = store.get_service(&service.id).await.unwrap().unwrap();
    engine.apply_probe_result(current, false).await.unwrap();

    let after = store.get_service(&service.id).await.unwrap().unwrap();
    assert_eq!(after.consecutive_failures, 3);
    assert_eq!(after.status, ServiceStatus::Unhealthy);
}

#[tokio::test]
async fn fresh_heartbeats_are_left_alone() {
    let store = test_store().await;
    let service = registry::register_service(&store, create("svc")).await.unwrap();

    let config = Config::default();
    let engine = HealthEngine::new(store.clone(), Arc::new(config)).unwrap();

    engine.run_heartbeat_sweep().await.unwrap();

    let unchanged = store.get_service(&service.id).await.unwrap().unwrap();
    assert_eq!(unchanged.status, ServiceStatus::Unknown);
}
