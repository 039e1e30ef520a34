//! Database credentials as stored in the secret manager.
//!
//! The record is the JSON blob written when the database is provisioned and
//! mounted into the pod as a file.

use std::{fmt, fs, path::Path};

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("failed to read secret file: {0}")]
    Io(#[from] std::io::Error),
    #[error("secret is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported database engine '{0}'")]
    UnsupportedEngine(String),
}

#[derive(Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DbSecret {
    pub username: String,
    pub password: String,
    pub host: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
    #[serde(alias = "database", alias = "db_name")]
    pub dbname: String,
    pub engine: String,
}

impl DbSecret {
    pub fn from_json(raw: &str) -> Result<Self, SecretError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, SecretError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn connection_url(&self) -> Result<String, SecretError> {
        let scheme = match self.engine.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "aurora-postgresql" => "postgres",
            other => return Err(SecretError::UnsupportedEngine(other.to_string())),
        };
        Ok(format!(
            "{scheme}://{}:{}@{}:{}/{}",
            encode_userinfo(&self.username),
            encode_userinfo(&self.password),
            self.host,
            self.port,
            self.dbname
        ))
    }
}

impl fmt::Debug for DbSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSecret")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("dbname", &self.dbname)
            .field("engine", &self.engine)
            .finish()
    }
}

/// Everything outside the RFC 3986 unreserved set.
const USERINFO: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Escapes a user name or password for the userinfo part of a URL.
pub fn encode_userinfo(raw: &str) -> String {
    utf8_percent_encode(raw, USERINFO).to_string()
}

fn port_from_number_or_string<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Number(u16),
        Text(String),
    }

    match Port::deserialize(deserializer)? {
        Port::Number(port) => Ok(port),
        Port::Text(raw) => raw.trim().parse().map_err(serde::de::Error::custom),
    }
}
