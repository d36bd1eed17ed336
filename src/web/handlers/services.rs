use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;

use crate::errors::AppResult;
use crate::models::{Service, ServiceCreate, ServiceListQuery, ServiceStatus, ServiceUpdate};
use crate::registry;
use crate::web::state::AppState;

/// `POST /services` — register or re-register. 201 for a brand new
/// service, 200 when an existing id was folded into.
pub async fn register(
    State(state): State<AppState>,
    Json(data): Json<ServiceCreate>,
) -> AppResult<(StatusCode, Json<Service>)> {
    registry::validate_service_create(&data)?;

    let existed = match &data.id {
        Some(id) => state.store.get_service(id).await?.is_some(),
        None => false,
    };

    let service = registry::register_service(&state.store, data).await?;
    let status = if existed { StatusCode::OK } else { StatusCode::CREATED };
    Ok((status, Json(service)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ServiceListQuery>,
) -> AppResult<Json<Vec<Service>>> {
    let status = query.status.as_deref().map(ServiceStatus::parse);
    let services = registry::get_all_services(&state.store, status, query.is_gateway).await?;
    Ok(Json(services))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Service>> {
    let service = registry::get_service(&state.store, &id)
        .await?
        .ok_or_else(|| crate::errors::AppError::not_found("service", &id))?;
    Ok(Json(service))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<ServiceUpdate>,
) -> AppResult<Json<Service>> {
    let service = registry::update_service(&state.store, &id, patch)
        .await?
        .ok_or_else(|| crate::errors::AppError::not_found("service", &id))?;
    Ok(Json(service))
}

pub async fn unregister(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let removed = registry::unregister_service(&state.store, &id).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(crate::errors::AppError::not_found("service", &id))
    }
}

pub async fn heartbeat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Service>> {
    let service = registry::heartbeat(&state.store, &id)
        .await?
        .ok_or_else(|| crate::errors::AppError::not_found("service", &id))?;
    Ok(Json(service))
}
