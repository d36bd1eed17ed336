use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::dependency;
use crate::errors::AppResult;
use crate::models::{Dependency, DependencyCreate, DependencyDirection, Topology};
use crate::web::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<DependencyCreate>,
) -> AppResult<(StatusCode, Json<Dependency>)> {
    let created = dependency::create_dependency(&state.store, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    let removed = dependency::delete_dependency(&state.store, id).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(crate::errors::AppError::not_found("dependency", id.to_string()))
    }
}

pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Dependency>>> {
    let deps = dependency::get_all_dependencies(&state.store).await?;
    Ok(Json(deps))
}

pub async fn topology(State(state): State<AppState>) -> AppResult<Json<Topology>> {
    let topology = dependency::get_topology(&state.store).await?;
    Ok(Json(topology))
}

pub async fn outgoing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Dependency>>> {
    let deps =
        dependency::get_service_dependencies(&state.store, &id, DependencyDirection::Outgoing)
            .await?;
    Ok(Json(deps))
}

pub async fn incoming(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Dependency>>> {
    let deps =
        dependency::get_service_dependencies(&state.store, &id, DependencyDirection::Incoming)
            .await?;
    Ok(Json(deps))
}
