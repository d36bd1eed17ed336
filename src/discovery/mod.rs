//! Read-only service discovery derivations over the store.

use crate::errors::AppResult;
use crate::models::{Service, ServiceStats, ServiceStatus};
use crate::store::Store;

/// Returns the service only if it is currently healthy.
pub async fn discover(store: &Store, service_id: &str) -> AppResult<Option<Service>> {
    Ok(store
        .get_service(service_id)
        .await?
        .filter(|s| s.status == ServiceStatus::Healthy))
}

pub async fn discover_all_healthy(store: &Store) -> AppResult<Vec<Service>> {
    store.list_services(Some(ServiceStatus::Healthy), None).await
}

pub async fn get_gateways(store: &Store) -> AppResult<Vec<Service>> {
    store.list_gateways_ordered().await
}

pub async fn get_stats(store: &Store) -> AppResult<ServiceStats> {
    let (total, healthy, unhealthy, gateways) = store.service_stats().await?;
    Ok(ServiceStats {
        total,
        healthy,
        unhealthy,
        unknown: total - healthy - unhealthy,
        gateways,
    })
}
