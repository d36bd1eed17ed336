//! Service lifecycle: register, re-register, update, unregister, heartbeat.
//!
//! Mirrors `registry.py` from the original implementation: ID synthesis from
//! the service name, re-registration-as-update when the caller supplies an
//! id that already exists, and automatic default-route creation for
//! non-gateway services.

mod id;

use crate::errors::{AppError, AppResult};
use crate::models::{Service, ServiceCreate, ServiceStatus, ServiceUpdate};
use crate::store::Store;

pub use id::generate_service_id;

/// Registers a new service, or — if `service_data.id` names a service that
/// already exists — folds the payload into that existing row, resetting its
/// health state the same way a fresh registration would.
///
/// Non-gateway services that don't yet have an inbound route get one
/// injected automatically (see [`inject_default_route`]).
pub async fn register_service(store: &Store, service_data: ServiceCreate) -> AppResult<Service> {
    let candidate_id = match &service_data.id {
        Some(id) if !id.is_empty() => id.clone(),
        _ => generate_service_id(&service_data.name),
    };

    if let Some(existing) = store.get_service(&candidate_id).await? {
        return reregister_existing(store, existing, service_data).await;
    }

    let now = chrono::Utc::now();
    let is_gateway = service_data.is_gateway.unwrap_or(false);

    let service = Service {
        id: candidate_id,
        name: service_data.name,
        host: service_data.host,
        port: service_data.port,
        protocol: service_data.protocol.unwrap_or_default(),
        health_check_path: service_data
            .health_check_path
            .unwrap_or_else(|| "/health".to_string()),
        status: ServiceStatus::Unknown,
        is_gateway,
        base_path: service_data.base_path,
        service_meta: service_data.service_meta,
        registered_at: now,
        last_heartbeat: Some(now),
        consecutive_failures: 0,
    };

    store.insert_service(&service).await?;

    if !is_gateway {
        inject_default_route(store, &service).await?;
    }

    Ok(service)
}

async fn reregister_existing(
    store: &Store,
    mut existing: Service,
    service_data: ServiceCreate,
) -> AppResult<Service> {
    existing.name = service_data.name;
    existing.host = service_data.host;
    existing.port = service_data.port;
    if let Some(protocol) = service_data.protocol {
        existing.protocol = protocol;
    }
    if let Some(path) = service_data.health_check_path {
        existing.health_check_path = path;
    }
    if let Some(is_gateway) = service_data.is_gateway {
        existing.is_gateway = is_gateway;
    }
    if service_data.base_path.is_some() {
        existing.base_path = service_data.base_path;
    }
    if service_data.service_meta.is_some() {
        existing.service_meta = service_data.service_meta;
    }
    existing.last_heartbeat = Some(chrono::Utc::now());
    existing.status = ServiceStatus::Unknown;
    existing.consecutive_failures = 0;

    store.save_service(&existing).await?;

    if !existing.is_gateway {
        inject_default_route(store, &existing).await?;
    }

    Ok(existing)
}

/// `/{service_id}/** -> service`, stripping the `/{service_id}` prefix
/// before forwarding. Only fires when a gateway exists and the service
/// doesn't already have an inbound route; the chosen gateway is the
/// lexicographically smallest gateway id, for a deterministic outcome when
/// several gateways are registered.
async fn inject_default_route(store: &Store, service: &Service) -> AppResult<()> {
    let gateway = match store.list_gateways_ordered().await?.into_iter().next() {
        Some(gateway) => gateway,
        None => return Ok(()),
    };

    if !store.routes_targeting(&service.id).await?.is_empty() {
        return Ok(());
    }

    store
        .insert_route(
            &gateway.id,
            &format!("/{}/**", service.id),
            "*",
            &service.id,
            true,
            Some(&format!("/{}", service.id)),
            10,
            true,
            None,
        )
        .await?;

    Ok(())
}

pub async fn unregister_service(store: &Store, service_id: &str) -> AppResult<bool> {
    store.delete_service(service_id).await
}

pub async fn update_service(
    store: &Store,
    service_id: &str,
    update: ServiceUpdate,
) -> AppResult<Option<Service>> {
    let mut service = match store.get_service(service_id).await? {
        Some(service) => service,
        None => return Ok(None),
    };

    if let Some(name) = update.name {
        service.name = name;
    }
    if let Some(host) = update.host {
        service.host = host;
    }
    if let Some(port) = update.port {
        service.port = port;
    }
    if let Some(protocol) = update.protocol {
        service.protocol = protocol;
    }
    if let Some(path) = update.health_check_path {
        service.health_check_path = path;
    }
    if let Some(is_gateway) = update.is_gateway {
        service.is_gateway = is_gateway;
    }
    if update.base_path.is_some() {
        service.base_path = update.base_path;
    }
    if update.service_meta.is_some() {
        service.service_meta = update.service_meta;
    }

    store.save_service(&service).await?;
    Ok(Some(service))
}

pub async fn get_service(store: &Store, service_id: &str) -> AppResult<Option<Service>> {
    store.get_service(service_id).await
}

pub async fn get_all_services(
    store: &Store,
    status: Option<ServiceStatus>,
    is_gateway: Option<bool>,
) -> AppResult<Vec<Service>> {
    store.list_services(status, is_gateway).await
}

/// Records a heartbeat: bumps `last_heartbeat`, marks the service healthy,
/// and clears the consecutive-failure counter. This is the only writer that
/// transitions a service out of `unhealthy` without the active probe also
/// succeeding — by design, a live heartbeat is itself proof of liveness.
pub async fn heartbeat(store: &Store, service_id: &str) -> AppResult<Option<Service>> {
    let mut service = match store.get_service(service_id).await? {
        Some(service) => service,
        None => return Ok(None),
    };

    service.last_heartbeat = Some(chrono::Utc::now());
    service.status = ServiceStatus::Healthy;
    service.consecutive_failures = 0;

    store.save_service(&service).await?;
    Ok(Some(service))
}

/// Validates the inbound payload before registration: port must be
/// nonzero and host must be non-empty. The original implementation leaves
/// this to pydantic; here it's an explicit precondition check at the
/// registry boundary.
pub fn validate_service_create(data: &ServiceCreate) -> AppResult<()> {
    if data.host.trim().is_empty() {
        return Err(AppError::precondition("host must not be empty"));
    }
    if data.port == 0 {
        return Err(AppError::precondition("port must be nonzero"));
    }
    if data.name.trim().is_empty() {
        return Err(AppError::precondition("name must not be empty"));
    }
    Ok(())
}
