use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;

use super::providers::{DbProviderId, default_registry, redact_url};

const ENTITY_MODULES: &str = "todo_api::db::entities::*";

pub struct ConnectedDb {
    pub db: DatabaseConnection,
    pub provider: DbProviderId,
}

/// Builds the pool for the configured database. Postgres pools connect
/// lazily, so an unreachable server surfaces on first use, not here.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<ConnectedDb> {
    let url = cfg.connection_url()?;
    let provider = default_registry()?.resolve(&url)?;

    info!(
        provider = provider.id().as_str(),
        url = %redact_url(&url),
        max_connections = cfg.max_connections,
        "connecting to database"
    );
    let db = provider.connect(&url, cfg).await?;
    provider.post_connect(&db).await?;

    Ok(ConnectedDb {
        db,
        provider: provider.id(),
    })
}

/// Creates the `todos` table (and any missing columns) from the entity
/// definitions. Safe to run on every start.
pub async fn init_schema(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("syncing database schema from entities");
    db.get_schema_registry(ENTITY_MODULES).sync(db).await?;
    info!("database schema initialized");
    Ok(())
}
