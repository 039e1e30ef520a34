use axum::Router;
use chrono::{DateTime, FixedOffset, TimeZone};
use sea_orm::DatabaseConnection;

use crate::{
    config::{AppConfig, DatabaseConfig},
    db::{connection, entities::todo, providers::DbProviderId},
    routes::app,
    state::AppState,
};

pub fn fixed_timestamp() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .expect("offset should be valid")
        .with_ymd_and_hms(2026, 1, 1, 0, 0, 0)
        .single()
        .expect("timestamp should be valid")
}

pub fn todo_model(id: i32, title: &str, completed: bool) -> todo::Model {
    let now = fixed_timestamp();
    todo::Model {
        id,
        title: title.to_string(),
        completed,
        created_at: now,
        updated_at: now,
    }
}

/// Full middleware stack over the given connection, usually a `MockDatabase`.
/// The schema counts as synced so mocks only see the queries under test.
pub fn test_app(db: DatabaseConnection) -> Router {
    let state = AppState::new(AppConfig::default(), db, DbProviderId::Postgres);
    state.mark_schema_ready();
    app(state).expect("build app")
}

/// Full middleware stack over a fresh in-memory SQLite database with the
/// schema applied.
pub async fn sqlite_app() -> Router {
    let cfg = AppConfig {
        database: DatabaseConfig {
            url: Some("sqlite::memory:".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let connected = connection::connect(&cfg.database)
        .await
        .expect("connect to sqlite");
    let state = AppState::new(cfg, connected.db, connected.provider);
    state.ensure_schema().await.expect("sync schema");
    app(state).expect("build app")
}
