//! Dependency graph management and topology materialization.

use crate::errors::{AppError, AppResult};
use crate::models::{Dependency, DependencyCreate, DependencyDirection, Topology, TopologyEdge, TopologyNode};
use crate::store::Store;

/// Records a (source depends on target) edge. Returns `NotFound` if either
/// service is unregistered; idempotent otherwise — declaring the same edge
/// twice returns the existing row.
pub async fn create_dependency(store: &Store, data: DependencyCreate) -> AppResult<Dependency> {
    if store.get_service(&data.source_service_id).await?.is_none() {
        return Err(AppError::not_found("service", &data.source_service_id));
    }
    if store.get_service(&data.target_service_id).await?.is_none() {
        return Err(AppError::not_found("service", &data.target_service_id));
    }

    store
        .create_dependency(
            &data.source_service_id,
            &data.target_service_id,
            data.description.as_deref(),
        )
        .await
}

pub async fn delete_dependency(store: &Store, id: i64) -> AppResult<bool> {
    store.delete_dependency(id).await
}

pub async fn get_all_dependencies(store: &Store) -> AppResult<Vec<Dependency>> {
    store.list_dependencies().await
}

pub async fn get_service_dependencies(
    store: &Store,
    service_id: &str,
    direction: DependencyDirection,
) -> AppResult<Vec<Dependency>> {
    store.dependencies_for_service(service_id, direction).await
}

/// Builds the full dependency graph: every registered service as a node,
/// every dependency row as a directed edge.
pub async fn get_topology(store: &Store) -> AppResult<Topology> {
    let services = store.list_services(None, None).await?;
    let dependencies = store.list_dependencies().await?;

    let nodes = services
        .into_iter()
        .map(|s| TopologyNode {
            id: s.id,
            name: s.name,
            status: s.status,
            is_gateway: s.is_gateway,
        })
        .collect();

    let edges = dependencies
        .into_iter()
        .map(|d| TopologyEdge {
            source: d.source_service_id,
            target: d.target_service_id,
            description: d.description,
        })
        .collect();

    Ok(Topology { nodes, edges })
}
