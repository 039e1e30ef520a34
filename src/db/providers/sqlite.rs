use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

use super::{
    pool_options,
    registry::{DbProvider, DbProviderId},
};
use crate::config::DatabaseConfig;

const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Local runs and tests. Not used in the cluster.
pub struct SqliteDbProvider;

#[async_trait]
impl DbProvider for SqliteDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Sqlite
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["sqlite"]
    }

    async fn connect(&self, url: &str, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut options = pool_options(url, cfg);
        // Each pooled connection to `:memory:` would see its own empty database.
        if url.contains(":memory:") {
            options.max_connections(1).min_connections(1);
        }
        Ok(Database::connect(options).await?)
    }

    async fn post_connect(&self, db: &DatabaseConnection) -> Result<()> {
        db.execute_unprepared(&format!("PRAGMA busy_timeout = {BUSY_TIMEOUT_MS}"))
            .await?;
        Ok(())
    }
}
