use serde_json::{Value, json};

use super::model::DeploymentTopology;

/// Flattens the declaration into the variables file the reconciler reads
/// (`terraform.tfvars.json`).
pub fn to_tfvars(topology: &DeploymentTopology) -> Value {
    let network = &topology.network;
    let cluster = &topology.cluster;
    let nodes = &topology.node_group;
    let database = &topology.database;
    let registry = &topology.registry;
    let http_tokens = if nodes.imds_v2_required {
        "required"
    } else {
        "optional"
    };

    let irsa_roles: Vec<Value> = topology
        .irsa
        .iter()
        .map(|role| {
            json!({
                "name": role.role_name,
                "namespace": role.namespace,
                "service_account": role.service_account,
                "subject": role.subject(),
                "policy_arns": role.policy_arns,
            })
        })
        .collect();

    let addons: serde_json::Map<String, Value> = topology
        .addons
        .iter()
        .map(|addon| {
            (
                addon.name.clone(),
                json!({
                    "version": addon.version,
                    "resolve_conflicts": addon.resolve_conflicts.as_str(),
                }),
            )
        })
        .collect();

    json!({
        "project": topology.project,
        "environment": topology.environment,
        "region": topology.region,
        "name_prefix": format!("{}-{}", topology.project, topology.environment),

        "vpc_cidr": network.vpc_cidr,
        "availability_zones": network.availability_zones,
        "public_subnet_cidrs": network.public_subnets,
        "private_subnet_cidrs": network.private_subnets,
        "single_nat_gateway": network.single_nat_gateway,
        "enable_flow_logs": network.flow_logs,

        "cluster_name": topology.cluster_name(),
        "cluster_version": cluster.version,
        "cluster_endpoint_public_access": cluster.endpoint_public_access,
        "cluster_endpoint_private_access": cluster.endpoint_private_access,
        "cluster_endpoint_public_access_cidrs": cluster.public_access_cidrs,
        "cluster_enabled_log_types": cluster.log_types,

        "node_instance_types": nodes.instance_types,
        "node_min_size": nodes.min_size,
        "node_desired_size": nodes.desired_size,
        "node_max_size": nodes.max_size,
        "node_disk_size": nodes.disk_size_gb,
        "node_disk_encrypted": nodes.disk_encrypted,
        "node_metadata_http_tokens": http_tokens,
        "node_metadata_http_put_response_hop_limit": nodes.imds_hop_limit,

        "irsa_roles": irsa_roles,
        "cluster_addons": addons,

        "db_engine": database.engine,
        "db_engine_version": database.engine_version,
        "db_instance_class": database.instance_class,
        "db_allocated_storage": database.allocated_storage_gb,
        "db_name": database.db_name,
        "db_username": database.username,
        "db_port": database.port,
        "db_multi_az": database.multi_az,
        "db_backup_retention_period": database.backup_retention_days,
        "db_publicly_accessible": database.publicly_accessible,
        "db_secret_name": topology.db_secret_name(),

        "ecr_repository_name": topology.repository_name(),
        "ecr_scan_on_push": registry.scan_on_push,
        "ecr_keep_last_images": registry.keep_last_images,
        "ecr_image_tag_mutability": registry.image_tag_mutability.as_str(),
    })
}
