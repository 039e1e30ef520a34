use serde::{Deserialize, Serialize};

/// Desired state of one environment. Consumed by the external reconciler;
/// nothing here talks to a cloud API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeploymentTopology {
    pub project: String,
    pub environment: String,
    #[serde(default = "default_region")]
    pub region: String,
    pub network: NetworkLayer,
    #[serde(default)]
    pub cluster: ClusterLayer,
    #[serde(default)]
    pub node_group: NodeGroupLayer,
    #[serde(default)]
    pub irsa: Vec<ServiceAccountRole>,
    #[serde(default)]
    pub addons: Vec<ManagedAddon>,
    #[serde(default)]
    pub database: DatabaseLayer,
    #[serde(default)]
    pub registry: RegistryLayer,
}

impl DeploymentTopology {
    /// `<project>-<environment>-<suffix>`, the naming scheme every declared
    /// resource follows.
    pub fn resource_name(&self, suffix: &str) -> String {
        format!("{}-{}-{}", self.project, self.environment, suffix)
    }

    pub fn cluster_name(&self) -> String {
        self.cluster
            .name
            .clone()
            .unwrap_or_else(|| self.resource_name("eks"))
    }

    pub fn db_secret_name(&self) -> String {
        self.database
            .secret_name
            .clone()
            .unwrap_or_else(|| self.resource_name("db-credentials"))
    }

    pub fn repository_name(&self) -> String {
        self.registry
            .repository_name
            .clone()
            .unwrap_or_else(|| format!("{}/todo-api", self.project))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkLayer {
    pub vpc_cidr: String,
    pub availability_zones: Vec<String>,
    pub public_subnets: Vec<String>,
    pub private_subnets: Vec<String>,
    /// One shared NAT gateway instead of one per AZ.
    #[serde(default = "default_true")]
    pub single_nat_gateway: bool,
    #[serde(default)]
    pub flow_logs: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterLayer {
    pub name: Option<String>,
    pub version: String,
    pub endpoint_public_access: bool,
    pub endpoint_private_access: bool,
    pub public_access_cidrs: Vec<String>,
    pub log_types: Vec<String>,
}

impl Default for ClusterLayer {
    fn default() -> Self {
        Self {
            name: None,
            version: "1.31".to_string(),
            endpoint_public_access: true,
            endpoint_private_access: true,
            public_access_cidrs: vec!["0.0.0.0/0".to_string()],
            log_types: vec!["api".to_string(), "audit".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct NodeGroupLayer {
    pub instance_types: Vec<String>,
    pub min_size: u32,
    pub desired_size: u32,
    pub max_size: u32,
    pub disk_size_gb: u32,
    pub disk_encrypted: bool,
    pub imds_v2_required: bool,
    pub imds_hop_limit: u8,
}

impl Default for NodeGroupLayer {
    fn default() -> Self {
        Self {
            instance_types: vec!["t3.medium".to_string()],
            min_size: 1,
            desired_size: 2,
            max_size: 3,
            disk_size_gb: 20,
            disk_encrypted: true,
            imds_v2_required: true,
            imds_hop_limit: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceAccountRole {
    pub namespace: String,
    pub service_account: String,
    pub role_name: String,
    #[serde(default)]
    pub policy_arns: Vec<String>,
}

impl ServiceAccountRole {
    /// `system:serviceaccount:<namespace>:<name>`, the OIDC subject the role
    /// trust policy is scoped to.
    pub fn subject(&self) -> String {
        format!(
            "system:serviceaccount:{}:{}",
            self.namespace, self.service_account
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictResolution {
    None,
    #[default]
    Overwrite,
    Preserve,
}

impl ConflictResolution {
    pub fn as_str(self) -> &'static str {
        match self {
            ConflictResolution::None => "NONE",
            ConflictResolution::Overwrite => "OVERWRITE",
            ConflictResolution::Preserve => "PRESERVE",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ManagedAddon {
    pub name: String,
    pub version: Option<String>,
    #[serde(default)]
    pub resolve_conflicts: ConflictResolution,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseLayer {
    pub engine: String,
    pub engine_version: String,
    pub instance_class: String,
    pub allocated_storage_gb: u32,
    pub db_name: String,
    pub username: String,
    pub port: u16,
    pub multi_az: bool,
    pub backup_retention_days: u32,
    pub publicly_accessible: bool,
    pub secret_name: Option<String>,
}

impl Default for DatabaseLayer {
    fn default() -> Self {
        Self {
            engine: "postgres".to_string(),
            engine_version: "16.3".to_string(),
            instance_class: "db.t3.micro".to_string(),
            allocated_storage_gb: 20,
            db_name: "tododb".to_string(),
            username: "todoadmin".to_string(),
            port: 5432,
            multi_az: false,
            backup_retention_days: 7,
            publicly_accessible: false,
            secret_name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagMutability {
    #[default]
    Mutable,
    Immutable,
}

impl TagMutability {
    pub fn as_str(self) -> &'static str {
        match self {
            TagMutability::Mutable => "MUTABLE",
            TagMutability::Immutable => "IMMUTABLE",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryLayer {
    pub repository_name: Option<String>,
    pub scan_on_push: bool,
    pub keep_last_images: u32,
    pub image_tag_mutability: TagMutability,
}

impl Default for RegistryLayer {
    fn default() -> Self {
        Self {
            repository_name: None,
            scan_on_push: true,
            keep_last_images: 10,
            image_tag_mutability: TagMutability::default(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_true() -> bool {
    true
}
