use std::sync::Arc;

use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use crate::{
    error::AppError,
    middleware::{catch_panic_layer, cors_layer, json_error_middleware},
    state::AppState,
};

use super::{api, health};

pub const API_PREFIX: &str = "/api";

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::router(state.clone()))
        .nest(API_PREFIX, api::router(state))
        .fallback(not_found)
}

/// The router with the full middleware stack, as served by the binary.
pub fn app(state: Arc<AppState>) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config.cors)?;
    Ok(router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

async fn not_found() -> AppError {
    AppError::not_found("Not Found")
}
