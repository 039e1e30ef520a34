use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};

use crate::{
    services::health_service::{HealthReport, HealthService},
    state::AppState,
};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

/// Readiness probe: 200 when the database answers and its schema is synced,
/// 503 otherwise. A schema sync that failed earlier is retried here.
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthReport>) {
    if let Err(err) = state.ensure_schema().await {
        tracing::warn!("database schema sync failed: {err:#}");
    }
    let report = HealthService::new(&state.db, &state.config.general.environment, state.storage)
        .check(state.schema_ready())
        .await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}
