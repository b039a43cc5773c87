use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use fridgewise_cache::StatsSnapshot;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    /// Seconds since the server started
    pub uptime: f64,
    pub environment: String,
    #[schema(value_type = Object)]
    pub cache: StatsSnapshot,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up; includes response cache statistics", body = HealthResponse)
    ),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: Utc::now(),
        uptime: state.started_at.elapsed().as_secs_f64(),
        environment: state.server_config.environment.to_string(),
        cache: state.cache.stats_snapshot(),
    })
}
