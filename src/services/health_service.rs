use sea_orm::{ConnectionTrait, DatabaseConnection};
use serde::Serialize;

use crate::db::providers::DbProviderId;

pub const SERVICE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: ServiceStatus,
    pub environment: String,
    pub version: &'static str,
    pub storage: &'static str,
    pub database: ComponentStatus,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == ServiceStatus::Healthy
    }
}

#[derive(Clone)]
pub struct HealthService {
    db: DatabaseConnection,
    environment: String,
    storage: DbProviderId,
}

impl HealthService {
    pub fn new(db: &DatabaseConnection, environment: &str, storage: DbProviderId) -> Self {
        Self {
            db: db.clone(),
            environment: environment.to_string(),
            storage,
        }
    }

    /// Probes the database with `SELECT 1`. A database that answers but has
    /// no synced schema cannot serve requests, so it is reported unhealthy.
    pub async fn check(&self, schema_ready: bool) -> HealthReport {
        let database = match self.db.execute_unprepared("SELECT 1").await {
            Ok(_) if schema_ready => ComponentStatus::Healthy,
            Ok(_) => {
                tracing::warn!("database answers but its schema is not synced yet");
                ComponentStatus::Unhealthy
            }
            Err(err) => {
                tracing::error!(error = %err, "database health check failed");
                ComponentStatus::Unhealthy
            }
        };
        let status = match database {
            ComponentStatus::Healthy => ServiceStatus::Healthy,
            ComponentStatus::Unhealthy => ServiceStatus::Degraded,
        };

        HealthReport {
            status,
            environment: self.environment.clone(),
            version: SERVICE_VERSION,
            storage: self.storage.storage_name(),
            database,
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::{ComponentStatus, HealthService, ServiceStatus};
    use crate::db::providers::DbProviderId;

    #[tokio::test]
    async fn reports_healthy_when_the_probe_query_succeeds() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let report = HealthService::new(&db, "prod", DbProviderId::Postgres)
            .check(true)
            .await;
        assert!(report.is_healthy());
        assert_eq!(report.database, ComponentStatus::Healthy);
        assert_eq!(report.storage, "postgresql");
        assert_eq!(report.environment, "prod");
    }

    #[tokio::test]
    async fn reports_degraded_when_the_database_is_unreachable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let report = HealthService::new(&db, "dev", DbProviderId::Postgres)
            .check(true)
            .await;
        assert_eq!(report.status, ServiceStatus::Degraded);
        assert_eq!(report.database, ComponentStatus::Unhealthy);
    }

    #[tokio::test]
    async fn reports_degraded_until_the_schema_is_synced() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let report = HealthService::new(&db, "dev", DbProviderId::Sqlite)
            .check(false)
            .await;
        assert_eq!(report.status, ServiceStatus::Degraded);
        assert_eq!(report.database, ComponentStatus::Unhealthy);
        assert_eq!(db.into_transaction_log().len(), 1);
    }
}
