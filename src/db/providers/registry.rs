use std::{collections::HashMap, sync::Arc};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::config::DatabaseConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbProviderId {
    Postgres,
    Sqlite,
}

impl DbProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            DbProviderId::Postgres => "postgres",
            DbProviderId::Sqlite => "sqlite",
        }
    }

    /// Storage label reported by the health endpoint.
    pub fn storage_name(self) -> &'static str {
        match self {
            DbProviderId::Postgres => "postgresql",
            DbProviderId::Sqlite => "sqlite",
        }
    }
}

#[async_trait]
pub trait DbProvider: Send + Sync {
    fn id(&self) -> DbProviderId;
    /// Lowercase URL schemes, without the trailing `:`.
    fn schemes(&self) -> &'static [&'static str];
    async fn connect(&self, url: &str, cfg: &DatabaseConfig) -> Result<DatabaseConnection>;
    async fn post_connect(&self, _db: &DatabaseConnection) -> Result<()> {
        Ok(())
    }
}

/// Providers indexed by the URL schemes they accept.
#[derive(Default)]
pub struct DbProviders {
    by_scheme: HashMap<&'static str, Arc<dyn DbProvider>>,
}

impl DbProviders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn DbProvider>) -> Result<Self> {
        self.register(provider)?;
        Ok(self)
    }

    pub fn register(&mut self, provider: Arc<dyn DbProvider>) -> Result<()> {
        for scheme in provider.schemes() {
            if let Some(existing) = self.by_scheme.get(scheme) {
                bail!(
                    "url scheme '{scheme}' is already handled by the {} provider",
                    existing.id().as_str()
                );
            }
        }
        for scheme in provider.schemes() {
            self.by_scheme.insert(scheme, provider.clone());
        }
        Ok(())
    }

    pub fn resolve(&self, url: &str) -> Result<Arc<dyn DbProvider>> {
        let scheme = url_scheme(url)
            .ok_or_else(|| anyhow!("database url '{}' has no scheme", redact_url(url)))?;
        self.by_scheme.get(scheme.as_str()).cloned().ok_or_else(|| {
            let mut known: Vec<&str> = self.by_scheme.keys().copied().collect();
            known.sort_unstable();
            anyhow!(
                "unsupported database scheme '{scheme}'; expected one of: {}",
                known.join(", ")
            )
        })
    }
}

fn url_scheme(url: &str) -> Option<String> {
    let (scheme, _) = url.trim().split_once(':')?;
    let valid = scheme
        .chars()
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then(|| scheme.to_ascii_lowercase())
}

/// Keeps only the scheme so credentials never reach the logs.
pub fn redact_url(url: &str) -> String {
    match url_scheme(url) {
        Some(scheme) if url.contains("://") => format!("{scheme}://<redacted>"),
        Some(scheme) => format!("{scheme}:<redacted>"),
        None => "<invalid-url>".to_string(),
    }
}
