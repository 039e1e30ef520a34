use anyhow::{Result, bail};

use super::AppConfig;

pub fn validate(cfg: &AppConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    if cfg.general.host.trim().is_empty() {
        errors.push("general.host must not be empty".to_string());
    }

    if cfg.general.environment.trim().is_empty() {
        errors.push("general.environment must not be empty".to_string());
    }

    let database = &cfg.database;
    if database.max_connections == 0 {
        errors.push("database.max_connections must be > 0".to_string());
    }

    if database.min_idle > database.max_connections {
        errors.push(format!(
            "database.min_idle ({}) must be <= database.max_connections ({})",
            database.min_idle, database.max_connections
        ));
    }

    if database.connect_timeout_secs == 0 {
        errors.push("database.connect_timeout_secs must be > 0".to_string());
    }

    if database.uses_parts() {
        if database.host.trim().is_empty() {
            errors.push("database.host must not be empty".to_string());
        }
        if database.name.trim().is_empty() {
            errors.push("database.name must not be empty".to_string());
        }
        if database.user.trim().is_empty() {
            errors.push("database.user must not be empty".to_string());
        }
        if database.port == 0 {
            errors.push("database.port must be > 0".to_string());
        }
    }

    if cfg
        .cors
        .allowed_origins
        .iter()
        .any(|origin| origin.trim().is_empty())
    {
        errors.push("cors.allowed_origins must not contain empty entries".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }

    bail!("invalid app config:\n- {}", errors.join("\n- "))
}
