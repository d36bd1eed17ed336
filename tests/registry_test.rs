use pretty_assertions::assert_eq;
use serviceatlas::models::{ServiceCreate, ServiceStatus};
use serviceatlas::registry;
use serviceatlas::store::Store;

async fn test_store() -> Store {
    Store::in_memory().await.expect("in-memory store")
}

fn create(name: &str, port: u16) -> ServiceCreate {
    ServiceCreate {
        id: None,
        name: name.to_string(),
        host: "127.0.0.1".to_string(),
        port,
        protocol: None,
        health_check_path: None,
        is_gateway: Some(false),
        base_path: None,
        service_meta: None,
    }
}

#[tokio::test]
async fn register_synthesizes_an_id_from_the_name() {
    let store = test_store().await;
    let service = registry::register_service(&store, create("Deckview API", 8080))
        .await
        .unwrap();

    assert!(service.id.starts_with("deckview-api-"));
    assert_eq!(service.status, ServiceStatus::Unknown);
    assert_eq!(service.consecutive_failures, 0);
    assert!(service.last_heartbeat.is_some());
}

/// Testable property 3: register is an upsert on id.
#[tokio::test]
async fn re_registering_an_existing_id_overwrites_and_resets_lifecycle_fields() {
    let store = test_store().await;

    let mut first = create("auth", 9001);
    first.id = Some("auth".to_string());
    let registered = registry::register_service(&store, first).await.unwrap();

    // Simulate it going unhealthy via heartbeat timeout sweep.
    let mut stale = registered.clone();
    stale.status = ServiceStatus::Unhealthy;
    stale.consecutive_failures = 5;
    store.save_service(&stale).await.unwrap();

    let mut second = create("auth-v2", 9002);
    second.id = Some("auth".to_string());
    let reregistered = registry::register_service(&store, second).await.unwrap();

    assert_eq!(reregistered.id, "auth");
    assert_eq!(reregistered.name, "auth-v2");
    assert_eq!(reregistered.port, 9002);
    assert_eq!(reregistered.status, ServiceStatus::Unknown);
    assert_eq!(reregistered.consecutive_failures, 0);
}

#[tokio::test]
async fn unregister_removes_the_service() {
    let store = test_store().await;
    let service = registry::register_service(&store, create("temp", 8000))
        .await
        .unwrap();

    assert!(registry::unregister_service(&store, &service.id).await.unwrap());
    assert!(registry::get_service(&store, &service.id).await.unwrap().is_none());
    assert!(!registry::unregister_service(&store, &service.id).await.unwrap());
}

/// Testable property 2: heartbeat is idempotent under repetition.
#[tokio::test]
async fn heartbeat_is_idempotent_and_dominates_probe_state() {
    let store = test_store().await;
    let service = registry::register_service(&store, create("flaky", 8100))
        .await
        .unwrap();

    let mut degraded = service.clone();
    degraded.status = ServiceStatus::Unhealthy;
    degraded.consecutive_failures = 10;
    store.save_service(&degraded).await.unwrap();

    let first = registry::heartbeat(&store, &service.id).await.unwrap().unwrap();
    assert_eq!(first.status, ServiceStatus::Healthy);
    assert_eq!(first.consecutive_failures, 0);

    let second = registry::heartbeat(&store, &service.id).await.unwrap().unwrap();
    assert_eq!(second.status, ServiceStatus::Healthy);
    assert_eq!(second.consecutive_failures, 0);
    assert!(second.last_heartbeat >= first.last_heartbeat);
}

#[tokio::test]
async fn update_leaves_lifecycle_fields_untouched() {
    let store = test_store().await;
    let service = registry::register_service(&store, create("svc", 8200))
        .await
        .unwrap();

    let patch = serviceatlas::models::ServiceUpdate {
        name: Some("svc-renamed".to_string()),
        ..Default::default()
    };
    let updated = registry::update_service(&store, &service.id, patch)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.name, "svc-renamed");
    assert_eq!(updated.status, service.status);
    assert_eq!(updated.consecutive_failures, service.consecutive_failures);
}

/// A non-gateway registration with a gateway present gets a default route.
#[tokio::test]
async fn non_gateway_registration_injects_a_default_route() {
    let store = test_store().await;

    let mut gateway = create("gw", 7000);
    gateway.id = Some("gw".to_string());
    gateway.is_gateway = Some(true);
    registry::register_service(&store, gateway).await.unwrap();

    let mut target = create("deckview", 8080);
    target.id = Some("deckview".to_string());
    let target = registry::register_service(&store, target).await.unwrap();

    let routes = store.routes_targeting(&target.id).await.unwrap();
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].path_pattern, "/deckview/**");
    assert!(routes[0].strip_prefix);
    assert_eq!(routes[0].strip_path.as_deref(), Some("/deckview"));
    assert_eq!(routes[0].priority, 10);
}

#[tokio::test]
async fn no_route_is_injected_without_a_gateway() {
    let store = test_store().await;
    let target = registry::register_service(&store, create("lonely", 8080))
        .await
        .unwrap();

    assert!(store.routes_targeting(&target.id).await.unwrap().is_empty());
}
