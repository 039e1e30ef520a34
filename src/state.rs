use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use crate::{
    config::AppConfig,
    db::{connection, providers::DbProviderId},
};

pub struct AppState {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    pub storage: DbProviderId,
    schema: OnceCell<()>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DatabaseConnection, storage: DbProviderId) -> Arc<Self> {
        Arc::new(Self {
            config,
            db,
            storage,
            schema: OnceCell::new(),
        })
    }

    pub fn schema_ready(&self) -> bool {
        self.schema.initialized()
    }

    /// Syncs the entity schema unless an earlier call succeeded. A failed
    /// sync leaves the state pending, so the next call tries again.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        self.schema
            .get_or_try_init(|| connection::init_schema(&self.db))
            .await?;
        Ok(())
    }

    /// For connections whose schema is managed elsewhere, e.g. mocks.
    pub fn mark_schema_ready(&self) {
        let _ = self.schema.set(());
    }
}
