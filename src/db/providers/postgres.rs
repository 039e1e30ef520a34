use anyhow::Result;
use async_trait::async_trait;
use sea_orm::{Database, DatabaseConnection};

use super::{
    pool_options,
    registry::{DbProvider, DbProviderId},
};
use crate::config::DatabaseConfig;

pub struct PostgresDbProvider;

#[async_trait]
impl DbProvider for PostgresDbProvider {
    fn id(&self) -> DbProviderId {
        DbProviderId::Postgres
    }

    fn schemes(&self) -> &'static [&'static str] {
        &["postgres", "postgresql"]
    }

    /// Lazy: the server must come up (and report `degraded`) while the
    /// database is still unreachable.
    async fn connect(&self, url: &str, cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
        let mut options = pool_options(url, cfg);
        options.connect_lazy(true);
        Ok(Database::connect(options).await?)
    }
}
