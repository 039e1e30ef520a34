use std::path::Path;

use ::config as config_rs;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Config read from `APP_*` variables, with `__` between nesting levels
/// (`APP_DATABASE__URL` -> `database.url`).
pub trait EnvConfig: Sized + DeserializeOwned {
    const PREFIX: &'static str = "APP";
    const SEPARATOR: &'static str = "__";
    /// Keys whose values are comma separated lists, e.g. `cors.allowed_origins`.
    const LIST_KEYS: &'static [&'static str] = &[];

    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Process environment, after loading `.env` from the crate root or the
    /// working directory when one exists.
    fn from_env() -> Result<Self> {
        let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        if dotenvy::from_filename(manifest_env).is_err() {
            let _ = dotenvy::dotenv();
        }
        Self::from_source(None)
    }

    /// Explicit variables instead of the process environment.
    fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config_rs::Map<String, String> = vars
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect();
        Self::from_source(Some(vars))
    }

    fn from_source(vars: Option<config_rs::Map<String, String>>) -> Result<Self> {
        let mut environment = config_rs::Environment::with_prefix(Self::PREFIX)
            .prefix_separator("_")
            .separator(Self::SEPARATOR)
            .try_parsing(true)
            .source(vars);
        if !Self::LIST_KEYS.is_empty() {
            environment = environment.list_separator(",");
            for key in Self::LIST_KEYS {
                environment = environment.with_list_parse_key(key);
            }
        }

        let cfg: Self = config_rs::Config::builder()
            .add_source(environment)
            .build()
            .context("failed to read config variables")?
            .try_deserialize()
            .context("failed to deserialize config")?;
        cfg.validate()?;
        Ok(cfg)
    }
}
