use axum::extract::{Path, State};
use axum::Json;

use crate::discovery;
use crate::errors::AppResult;
use crate::models::Service;
use crate::web::state::AppState;

pub async fn discover(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Service>> {
    let service = discovery::discover(&state.store, &id)
        .await?
        .ok_or_else(|| crate::errors::AppError::not_found("healthy service", &id))?;
    Ok(Json(service))
}

pub async fn gateways(State(state): State<AppState>) -> AppResult<Json<Vec<Service>>> {
    let services = discovery::get_gateways(&state.store).await?;
    Ok(Json(services))
}
