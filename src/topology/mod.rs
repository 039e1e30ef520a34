//! Declared desired state for the cluster, database and registry the API
//! runs on. Reconciling it is left to the external orchestration tool; this
//! module only loads, checks and renders the declaration.

use std::path::Path;

use config::{Config, File, FileFormat};
use thiserror::Error;

pub mod cidr;
pub mod model;
pub mod plan;
pub mod render;
pub mod validate;

pub use model::DeploymentTopology;
pub use plan::{Layer, LayerPlan, apply_order};
pub use render::to_tfvars;
pub use validate::validate;

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("failed to load topology: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid topology:\n- {}", .0.join("\n- "))]
    Invalid(Vec<String>),
    #[error("failed to render topology: {0}")]
    Render(#[from] serde_json::Error),
}

/// Reads a declaration file; the format follows the extension
/// (`.toml`, `.json`, `.yaml`).
pub fn load(path: impl AsRef<Path>) -> Result<DeploymentTopology, TopologyError> {
    let topology = Config::builder()
        .add_source(File::from(path.as_ref()))
        .build()?
        .try_deserialize()?;
    Ok(topology)
}

/// [`load`] followed by [`validate`]; what every CLI subcommand starts with.
pub fn load_valid(path: impl AsRef<Path>) -> Result<DeploymentTopology, TopologyError> {
    let topology = load(path)?;
    topology.validate()?;
    Ok(topology)
}

pub fn parse(raw: &str, format: FileFormat) -> Result<DeploymentTopology, TopologyError> {
    let topology = Config::builder()
        .add_source(File::from_str(raw, format))
        .build()?
        .try_deserialize()?;
    Ok(topology)
}

impl DeploymentTopology {
    pub fn validate(&self) -> Result<(), TopologyError> {
        validate::validate(self)
    }

    pub fn apply_order(&self) -> Vec<LayerPlan> {
        plan::apply_order(self)
    }

    pub fn to_tfvars(&self) -> serde_json::Value {
        render::to_tfvars(self)
    }
}
