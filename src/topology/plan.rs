use serde::Serialize;

use super::model::DeploymentTopology;

/// Provisioning layers in the order the reconciler applies them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Network,
    Cluster,
    NodeGroup,
    Identity,
    Addons,
    Database,
    Registry,
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Network,
        Layer::Cluster,
        Layer::NodeGroup,
        Layer::Identity,
        Layer::Addons,
        Layer::Database,
        Layer::Registry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Network => "network",
            Layer::Cluster => "cluster",
            Layer::NodeGroup => "node_group",
            Layer::Identity => "identity",
            Layer::Addons => "addons",
            Layer::Database => "database",
            Layer::Registry => "registry",
        }
    }

    pub fn depends_on(self) -> &'static [Layer] {
        match self {
            Layer::Network => &[],
            Layer::Cluster => &[Layer::Network],
            Layer::NodeGroup => &[Layer::Cluster],
            // IRSA trusts the cluster's OIDC provider.
            Layer::Identity => &[Layer::Cluster],
            Layer::Addons => &[Layer::NodeGroup, Layer::Identity],
            Layer::Database => &[Layer::Network],
            Layer::Registry => &[],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerPlan {
    pub layer: Layer,
    pub depends_on: Vec<Layer>,
    pub resources: Vec<String>,
}

pub fn apply_order(topology: &DeploymentTopology) -> Vec<LayerPlan> {
    Layer::ALL
        .iter()
        .map(|&layer| LayerPlan {
            layer,
            depends_on: layer.depends_on().to_vec(),
            resources: resources(topology, layer),
        })
        .collect()
}

fn resources(topology: &DeploymentTopology, layer: Layer) -> Vec<String> {
    let network = &topology.network;
    match layer {
        Layer::Network => {
            let mut names = vec![topology.resource_name("vpc")];
            names.extend(
                (0..network.public_subnets.len())
                    .map(|i| topology.resource_name(&format!("public-{i}"))),
            );
            names.extend(
                (0..network.private_subnets.len())
                    .map(|i| topology.resource_name(&format!("private-{i}"))),
            );
            let nat_count = if network.single_nat_gateway {
                1
            } else {
                network.availability_zones.len()
            };
            names.extend((0..nat_count).map(|i| topology.resource_name(&format!("nat-{i}"))));
            if network.flow_logs {
                names.push(topology.resource_name("flow-logs"));
            }
            names
        }
        Layer::Cluster => vec![
            topology.cluster_name(),
            topology.resource_name("oidc-provider"),
        ],
        Layer::NodeGroup => vec![topology.resource_name("nodes")],
        Layer::Identity => topology
            .irsa
            .iter()
            .map(|role| role.role_name.clone())
            .collect(),
        Layer::Addons => topology
            .addons
            .iter()
            .map(|addon| addon.name.clone())
            .collect(),
        Layer::Database => vec![
            topology.resource_name("db-subnet-group"),
            topology.resource_name("postgres"),
            topology.db_secret_name(),
        ],
        Layer::Registry => vec![topology.repository_name()],
    }
}
