use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::discovery;
use crate::errors::AppResult;
use crate::models::ServiceStats;
use crate::web::state::AppState;

pub async fn overview(State(state): State<AppState>) -> AppResult<Json<ServiceStats>> {
    let stats = discovery::get_stats(&state.store).await?;
    Ok(Json(stats))
}

#[derive(Debug, Serialize)]
pub struct HealthCheckReport {
    pub checked: usize,
    pub healthy: usize,
    pub unhealthy: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// `POST /monitor/health-check` — runs one full probe pass immediately,
/// outside the regular schedule.
pub async fn trigger_health_check(
    State(state): State<AppState>,
) -> AppResult<Json<HealthCheckReport>> {
    let summary = state.health.trigger_full_probe().await?;
    Ok(Json(HealthCheckReport {
        checked: summary.checked,
        healthy: summary.healthy,
        unhealthy: summary.unhealthy,
        timestamp: chrono::Utc::now(),
    }))
}
