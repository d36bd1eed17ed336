use serviceatlas::dependency;
use serviceatlas::models::{DependencyCreate, DependencyDirection, RouteCreate, ServiceCreate};
use serviceatlas::registry;
use serviceatlas::route;
use serviceatlas::store::Store;

async fn test_store() -> Store {
    Store::in_memory().await.expect("in-memory store")
}

fn create(id: &str, is_gateway: bool) -> ServiceCreate {
    ServiceCreate {
        id: Some(id.to_string()),
        name: id.to_string(),
        host: "127.0.0.1".to_string(),
        port: 9000,
        protocol: None,
        health_check_path: None,
        is_gateway: Some(is_gateway),
        base_path: None,
        service_meta: None,
    }
}

#[tokio::test]
async fn create_dependency_requires_both_services_to_exist() {
    let store = test_store().await;
    registry::register_service(&store, create("svc-a", false)).await.unwrap();

    let err = dependency::create_dependency(
        &store,
        DependencyCreate {
            source_service_id: "svc-a".to_string(),
            target_service_id: "svc-b".to_string(),
            description: None,
        },
    )
    .await
    .unwrap_err();

    assert!(matches!(err, serviceatlas::errors::AppError::NotFound { .. }));
}

#[tokio::test]
async fn declaring_the_same_dependency_twice_is_idempotent() {
    let store = test_store().await;
    registry::register_service(&store, create("svc-a", false)).await.unwrap();
    registry::register_service(&store, create("svc-b", false)).await.unwrap();

    let data = DependencyCreate {
        source_service_id: "svc-a".to_string(),
        target_service_id: "svc-b".to_string(),
        description: Some("calls b".to_string()),
    };
    let first = dependency::create_dependency(&store, data.clone()).await.unwrap();
    let second = dependency::create_dependency(&store, data).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(dependency::get_all_dependencies(&store).await.unwrap().len(), 1);
}

/// S4 — cascade delete.
#[tokio::test]
async fn deleting_a_service_cascades_dependencies_and_routes() {
    let store = test_store().await;
    registry::register_service(&store, create("gw", true)).await.unwrap();
    registry::register_service(&store, create("svc-a", false)).await.unwrap();
    registry::register_service(&store, create("svc-b", false)).await.unwrap();

    dependency::create_dependency(
        &store,
        DependencyCreate {
            source_service_id: "svc-a".to_string(),
            target_service_id: "svc-b".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    route::create_route(
        &store,
        RouteCreate {
            gateway_service_id: "gw".to_string(),
            path_pattern: "/svc-b/explicit".to_string(),
            methods: "*".to_string(),
            target_service_id: "svc-b".to_string(),
            strip_prefix: false,
            strip_path: None,
            priority: 5,
            enabled: true,
            auth_config: None,
        },
    )
    .await
    .unwrap();

    assert!(registry::unregister_service(&store, "svc-b").await.unwrap());

    assert!(dependency::get_all_dependencies(&store).await.unwrap().is_empty());
    assert!(route::get_all_routes(&store, None, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn topology_lists_every_service_and_dependency_edge() {
    let store = test_store().await;
    registry::register_service(&store, create("svc-a", false)).await.unwrap();
    registry::register_service(&store, create("svc-b", false)).await.unwrap();
    dependency::create_dependency(
        &store,
        DependencyCreate {
            source_service_id: "svc-a".to_string(),
            target_service_id: "svc-b".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let topology = dependency::get_topology(&store).await.unwrap();
    assert_eq!(topology.nodes.len(), 2);
    assert_eq!(topology.edges.len(), 1);
    assert_eq!(topology.edges[0].source, "svc-a");
    assert_eq!(topology.edges[0].target, "svc-b");
}

#[tokio::test]
async fn dependency_direction_filters_correctly() {
    let store = test_store().await;
    registry::register_service(&store, create("svc-a", false)).await.unwrap();
    registry::register_service(&store, create("svc-b", false)).await.unwrap();
    dependency::create_dependency(
        &store,
        DependencyCreate {
            source_service_id: "svc-a".to_string(),
            target_service_id: "svc-b".to_string(),
            description: None,
        },
    )
    .await
    .unwrap();

    let outgoing =
        dependency::get_service_dependencies(&store, "svc-a", DependencyDirection::Outgoing)
            .await
            .unwrap();
    let incoming =
        dependency::get_service_dependencies(&store, "svc-a", DependencyDirection::Incoming)
            .await
            .unwrap();

    assert_eq!(outgoing.len(), 1);
    assert!(incoming.is_empty());
}
