use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::errors::AppResult;
use crate::models::{GatewayRoute, Route, RouteCreate, RouteUpdate};
use crate::route;
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RouteListParams {
    pub gateway_id: Option<String>,
    #[serde(default)]
    pub enabled_only: bool,
}

pub async fn create(
    State(state): State<AppState>,
    Json(data): Json<RouteCreate>,
) -> AppResult<(StatusCode, Json<Route>)> {
    let created = route::create_route(&state.store, data).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<RouteListParams>,
) -> AppResult<Json<Vec<Route>>> {
    let routes = route::get_all_routes(
        &state.store,
        params.gateway_id.as_deref(),
        params.enabled_only,
    )
    .await?;
    Ok(Json(routes))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<Route>> {
    let route = route::get_route(&state.store, id)
        .await?
        .ok_or_else(|| crate::errors::AppError::not_found("route", id.to_string()))?;
    Ok(Json(route))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(patch): Json<RouteUpdate>,
) -> AppResult<Json<Route>> {
    let route = route::update_route(&state.store, id, patch)
        .await?
        .ok_or_else(|| crate::errors::AppError::not_found("route", id.to_string()))?;
    Ok(Json(route))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<StatusCode> {
    let removed = route::delete_route(&state.store, id).await?;
    if removed {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(crate::errors::AppError::not_found("route", id.to_string()))
    }
}

/// `GET /gateway/routes` — caller identifies itself via `X-Gateway-ID`.
pub async fn gateway_routes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<Vec<GatewayRoute>>> {
    let gateway_id = headers
        .get("x-gateway-id")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| crate::errors::AppError::precondition("missing X-Gateway-ID header"))?;

    let routes = route::get_gateway_routes(&state.store, gateway_id).await?;
    Ok(Json(routes))
}
