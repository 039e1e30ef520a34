use std::collections::HashSet;

use ipnet::Ipv4Net;

use super::{
    TopologyError,
    cidr::{overlaps, parse_network},
    model::{DeploymentTopology, NetworkLayer},
};

pub const EBS_CSI_ADDON: &str = "ebs-csi-driver";
pub const EBS_CSI_NAMESPACE: &str = "kube-system";
pub const EBS_CSI_SERVICE_ACCOUNT: &str = "ebs-csi-controller-sa";

const MAX_BACKUP_RETENTION_DAYS: u32 = 35;

/// Checks the whole declaration and reports every violation at once.
pub fn validate(topology: &DeploymentTopology) -> Result<(), TopologyError> {
    let mut errors: Vec<String> = Vec::new();

    check_name("project", &topology.project, &mut errors);
    check_name("environment", &topology.environment, &mut errors);
    if topology.region.trim().is_empty() {
        errors.push("region must not be empty".to_string());
    }

    check_network(&topology.network, &mut errors);

    let cluster = &topology.cluster;
    if !is_major_minor(&cluster.version) {
        errors.push(format!(
            "cluster.version '{}' must look like <major>.<minor>",
            cluster.version
        ));
    }
    if !cluster.endpoint_public_access && !cluster.endpoint_private_access {
        errors.push("cluster endpoint must be reachable publicly or privately".to_string());
    }
    if cluster.endpoint_public_access {
        for raw in &cluster.public_access_cidrs {
            if let Err(err) = parse_network(raw) {
                errors.push(format!("cluster.public_access_cidrs: {err}"));
            }
        }
    }

    let nodes = &topology.node_group;
    if nodes.instance_types.is_empty() {
        errors.push("node_group.instance_types must not be empty".to_string());
    }
    if nodes.max_size == 0 {
        errors.push("node_group.max_size must be > 0".to_string());
    }
    if nodes.min_size > nodes.desired_size || nodes.desired_size > nodes.max_size {
        errors.push(format!(
            "node_group sizes must satisfy min ({}) <= desired ({}) <= max ({})",
            nodes.min_size, nodes.desired_size, nodes.max_size
        ));
    }
    if nodes.disk_size_gb == 0 {
        errors.push("node_group.disk_size_gb must be > 0".to_string());
    }
    if !nodes.disk_encrypted {
        errors.push("node_group.disk_encrypted must be true".to_string());
    }
    if !nodes.imds_v2_required {
        errors.push("node_group.imds_v2_required must be true".to_string());
    }
    if !(1..=64).contains(&nodes.imds_hop_limit) {
        errors.push(format!(
            "node_group.imds_hop_limit ({}) must be within 1..=64",
            nodes.imds_hop_limit
        ));
    }

    check_identity(topology, &mut errors);

    let database = &topology.database;
    if database.publicly_accessible {
        errors.push("database.publicly_accessible must be false".to_string());
    }
    if database.port == 0 {
        errors.push("database.port must be > 0".to_string());
    }
    if database.allocated_storage_gb == 0 {
        errors.push("database.allocated_storage_gb must be > 0".to_string());
    }
    if database.backup_retention_days > MAX_BACKUP_RETENTION_DAYS {
        errors.push(format!(
            "database.backup_retention_days ({}) must be <= {MAX_BACKUP_RETENTION_DAYS}",
            database.backup_retention_days
        ));
    }
    for (field, value) in [
        ("engine", &database.engine),
        ("instance_class", &database.instance_class),
        ("db_name", &database.db_name),
        ("username", &database.username),
    ] {
        if value.trim().is_empty() {
            errors.push(format!("database.{field} must not be empty"));
        }
    }

    if topology.registry.keep_last_images == 0 {
        errors.push("registry.keep_last_images must be > 0".to_string());
    }

    if errors.is_empty() {
        return Ok(());
    }
    Err(TopologyError::Invalid(errors))
}

fn check_name(field: &str, value: &str, errors: &mut Vec<String>) {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !value.starts_with('-')
        && !value.ends_with('-');
    if !valid {
        errors.push(format!(
            "{field} '{value}' must be lowercase letters, digits and inner hyphens"
        ));
    }
}

fn is_major_minor(version: &str) -> bool {
    match version.split_once('.') {
        Some((major, minor)) => [major, minor]
            .iter()
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())),
        None => false,
    }
}

fn check_network(network: &NetworkLayer, errors: &mut Vec<String>) {
    let zones = network.availability_zones.len();
    if zones == 0 {
        errors.push("network.availability_zones must not be empty".to_string());
    }
    let unique_zones: HashSet<&str> = network
        .availability_zones
        .iter()
        .map(String::as_str)
        .collect();
    if unique_zones.len() != zones {
        errors.push("network.availability_zones must not repeat".to_string());
    }

    for (field, subnets) in [
        ("public_subnets", &network.public_subnets),
        ("private_subnets", &network.private_subnets),
    ] {
        if subnets.len() != zones {
            errors.push(format!(
                "network.{field} has {} entries but {zones} availability zones are declared",
                subnets.len()
            ));
        }
    }

    let vpc = match parse_network(&network.vpc_cidr) {
        Ok(vpc) => Some(vpc),
        Err(err) => {
            errors.push(format!("network.vpc_cidr: {err}"));
            None
        }
    };

    let mut parsed: Vec<(String, Ipv4Net)> = Vec::new();
    for raw in network.public_subnets.iter().chain(&network.private_subnets) {
        match parse_network(raw) {
            Ok(subnet) => parsed.push((raw.clone(), subnet)),
            Err(err) => errors.push(format!("network subnet: {err}")),
        }
    }

    if let Some(vpc) = vpc {
        for (raw, subnet) in &parsed {
            if !vpc.contains(subnet) {
                errors.push(format!("subnet {raw} is outside vpc_cidr {vpc}"));
            }
        }
    }

    for (index, (left_raw, left)) in parsed.iter().enumerate() {
        for (right_raw, right) in &parsed[index + 1..] {
            if overlaps(left, right) {
                errors.push(format!("subnets {left_raw} and {right_raw} overlap"));
            }
        }
    }
}

fn check_identity(topology: &DeploymentTopology, errors: &mut Vec<String>) {
    let mut role_names = HashSet::new();
    let mut bindings = HashSet::new();
    for role in &topology.irsa {
        if role.namespace.trim().is_empty()
            || role.service_account.trim().is_empty()
            || role.role_name.trim().is_empty()
        {
            errors.push(
                "irsa entries need namespace, service_account and role_name".to_string(),
            );
            continue;
        }
        if !role_names.insert(role.role_name.as_str()) {
            errors.push(format!("irsa role_name '{}' is declared twice", role.role_name));
        }
        if !bindings.insert((role.namespace.as_str(), role.service_account.as_str())) {
            errors.push(format!("irsa binding {} is declared twice", role.subject()));
        }
    }

    let mut addon_names = HashSet::new();
    for addon in &topology.addons {
        if !addon_names.insert(addon.name.as_str()) {
            errors.push(format!("addon '{}' is declared twice", addon.name));
        }
    }

    if addon_names.contains(EBS_CSI_ADDON)
        && !bindings.contains(&(EBS_CSI_NAMESPACE, EBS_CSI_SERVICE_ACCOUNT))
    {
        errors.push(format!(
            "addon '{EBS_CSI_ADDON}' requires an irsa binding for \
             {EBS_CSI_NAMESPACE}/{EBS_CSI_SERVICE_ACCOUNT}"
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::validate;
    use crate::topology::{TopologyError, model::ServiceAccountRole, tests::sample};

    fn violations(topology: &crate::topology::DeploymentTopology) -> Vec<String> {
        match validate(topology) {
            Ok(()) => Vec::new(),
            Err(TopologyError::Invalid(errors)) => errors,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sample_declaration_is_valid() {
        assert_eq!(violations(&sample()), Vec::<String>::new());
    }

    #[test]
    fn reports_every_violation_together() {
        let mut topology = sample();
        topology.node_group.disk_encrypted = false;
        topology.node_group.imds_v2_required = false;
        topology.database.publicly_accessible = true;
        topology.registry.keep_last_images = 0;

        let errors = violations(&topology);
        assert_eq!(errors.len(), 4, "{errors:?}");
    }

    #[test]
    fn subnets_must_sit_inside_the_vpc_without_overlap() {
        let mut topology = sample();
        topology.network.public_subnets[0] = "10.1.0.0/24".to_string();
        topology.network.private_subnets[1] = topology.network.private_subnets[0].clone();

        let errors = violations(&topology);
        assert!(errors.iter().any(|e| e.contains("outside vpc_cidr")), "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("overlap")), "{errors:?}");
    }

    #[test]
    fn subnet_counts_follow_availability_zones() {
        let mut topology = sample();
        topology.network.private_subnets.pop();

        let errors = violations(&topology);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("private_subnets"));
    }

    #[test]
    fn node_group_sizes_must_be_ordered() {
        let mut topology = sample();
        topology.node_group.min_size = 3;
        topology.node_group.desired_size = 2;

        let errors = violations(&topology);
        assert!(errors.iter().any(|e| e.contains("min (3) <= desired (2)")));
    }

    #[test]
    fn empty_node_groups_are_rejected() {
        let mut topology = sample();
        topology.node_group.min_size = 0;
        topology.node_group.desired_size = 0;
        topology.node_group.max_size = 0;

        let errors = violations(&topology);
        assert_eq!(errors, ["node_group.max_size must be > 0"]);
    }

    #[test]
    fn imds_hop_limit_must_be_within_range() {
        for hop_limit in [0, 65] {
            let mut topology = sample();
            topology.node_group.imds_hop_limit = hop_limit;

            let errors = violations(&topology);
            assert_eq!(
                errors,
                [format!(
                    "node_group.imds_hop_limit ({hop_limit}) must be within 1..=64"
                )]
            );
        }
        for hop_limit in [1, 64] {
            let mut topology = sample();
            topology.node_group.imds_hop_limit = hop_limit;
            assert_eq!(violations(&topology), Vec::<String>::new(), "{hop_limit}");
        }
    }

    #[test]
    fn cidrs_with_host_bits_are_reported() {
        let mut topology = sample();
        topology.network.vpc_cidr = "10.0.0.1/16".to_string();

        let errors = violations(&topology);
        assert_eq!(errors, ["network.vpc_cidr: '10.0.0.1/16' has host bits set"]);
    }

    #[test]
    fn ebs_csi_addon_needs_its_controller_binding() {
        let mut topology = sample();
        topology
            .irsa
            .retain(|role| role.service_account != super::EBS_CSI_SERVICE_ACCOUNT);

        let errors = violations(&topology);
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("ebs-csi-driver"));
    }

    #[test]
    fn duplicate_bindings_are_rejected() {
        let mut topology = sample();
        let first = topology.irsa[0].clone();
        topology.irsa.push(ServiceAccountRole {
            role_name: format!("{}-copy", first.role_name),
            ..first
        });

        let errors = violations(&topology);
        assert!(errors.iter().any(|e| e.contains("declared twice")), "{errors:?}");
    }

    #[test]
    fn names_must_be_usable_in_resource_names() {
        let mut topology = sample();
        topology.environment = "Prod".to_string();
        topology.cluster.version = "latest".to_string();

        let errors = violations(&topology);
        assert_eq!(errors.len(), 2, "{errors:?}");
    }
}
