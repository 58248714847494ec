//! Per-provider field rules for every resource kind
//!
//! The catalog is a static table keyed by (provider, kind). It is pure
//! lookup and validation: nothing here mutates a caller's configuration.

use crate::config::ResourceConfig;
use crate::error::{CloudError, Result};
use crate::kind::{Provider, ResourceKind};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

/// Mandatory and optional fields for one (provider, kind) pair.
///
/// Mandatory fields never carry a default; every optional field does.
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub mandatory: Vec<&'static str>,
    pub optional: BTreeMap<&'static str, Value>,
}

impl FieldSpec {
    fn new(mandatory: &[&'static str], optional: Vec<(&'static str, Value)>) -> Self {
        Self {
            mandatory: mandatory.to_vec(),
            optional: optional.into_iter().collect(),
        }
    }

    /// Mandatory fields absent from `config`, in declaration order
    pub fn missing_fields(&self, config: &ResourceConfig) -> Vec<String> {
        self.mandatory
            .iter()
            .filter(|field| !config.contains(field))
            .map(|field| field.to_string())
            .collect()
    }

    pub fn default_for(&self, field: &str) -> Option<&Value> {
        self.optional.get(field)
    }
}

static CATALOG: LazyLock<HashMap<(Provider, ResourceKind), FieldSpec>> = LazyLock::new(|| {
    use Provider::*;
    use ResourceKind::*;

    let mut table = HashMap::new();

    // AWS
    table.insert(
        (Aws, VirtualMachine),
        FieldSpec::new(
            &["instance_type", "ami"],
            vec![
                ("key_pair", json!("")),
                ("security_groups", json!([])),
                ("root_volume_gb", json!(20)),
                ("ebs_optimized", json!(false)),
            ],
        ),
    );
    table.insert(
        (Aws, Database),
        FieldSpec::new(
            &["engine", "instance_class"],
            vec![
                ("allocated_storage", json!(20)),
                ("multi_az", json!(false)),
                ("backup_retention_days", json!(7)),
            ],
        ),
    );
    table.insert(
        (Aws, LoadBalancer),
        FieldSpec::new(
            &["lb_type"],
            vec![
                ("scheme", json!("internet-facing")),
                ("listeners", json!([])),
                ("health_check_path", json!("/health")),
            ],
        ),
    );
    table.insert(
        (Aws, ObjectStore),
        FieldSpec::new(
            &[],
            vec![
                ("storage_class", json!("STANDARD")),
                ("versioning_enabled", json!(false)),
            ],
        ),
    );

    // Azure
    table.insert(
        (Azure, VirtualMachine),
        FieldSpec::new(
            &["vm_size", "image"],
            vec![
                ("admin_username", json!("azureuser")),
                ("os_disk_gb", json!(30)),
                ("security_groups", json!([])),
            ],
        ),
    );
    table.insert(
        (Azure, Database),
        FieldSpec::new(
            &["engine", "sku_name"],
            vec![
                ("storage_gb", json!(32)),
                ("backup_retention_days", json!(7)),
            ],
        ),
    );
    table.insert(
        (Azure, LoadBalancer),
        FieldSpec::new(
            &["sku"],
            vec![
                ("frontend_port", json!(80)),
                ("probe_path", json!("/health")),
                ("listeners", json!([])),
            ],
        ),
    );
    table.insert(
        (Azure, ObjectStore),
        FieldSpec::new(
            &[],
            vec![
                ("account_tier", json!("Standard")),
                ("replication", json!("LRS")),
                ("access_tier", json!("Hot")),
            ],
        ),
    );

    // GCP
    table.insert(
        (Gcp, VirtualMachine),
        FieldSpec::new(
            &["machine_type", "image_family"],
            vec![
                ("boot_disk_size", json!(20)),
                ("preemptible", json!(false)),
                ("security_groups", json!([])),
            ],
        ),
    );
    table.insert(
        (Gcp, Database),
        FieldSpec::new(
            &["engine", "tier"],
            vec![("engine_version", json!("13")), ("storage_size", json!(20))],
        ),
    );
    table.insert(
        (Gcp, LoadBalancer),
        FieldSpec::new(
            &[],
            vec![("lb_type", json!("HTTP(S)")), ("listeners", json!([]))],
        ),
    );
    table.insert(
        (Gcp, ObjectStore),
        FieldSpec::new(
            &[],
            vec![
                ("location", json!("US")),
                ("storage_class", json!("STANDARD")),
                ("versioning_enabled", json!(false)),
            ],
        ),
    );

    // Oracle
    table.insert(
        (Oracle, VirtualMachine),
        FieldSpec::new(
            &["shape", "image_id"],
            vec![
                ("ocpus", json!(1)),
                ("memory_in_gbs", json!(16)),
                ("boot_volume_gb", json!(50)),
                ("security_groups", json!([])),
            ],
        ),
    );
    table.insert(
        (Oracle, Database),
        FieldSpec::new(
            &["db_workload"],
            vec![
                ("cpu_core_count", json!(1)),
                ("data_storage_tbs", json!(1)),
                ("db_version", json!("19c")),
            ],
        ),
    );
    table.insert(
        (Oracle, LoadBalancer),
        FieldSpec::new(
            &["shape"],
            vec![
                ("min_bandwidth_mbps", json!(10)),
                ("max_bandwidth_mbps", json!(100)),
                ("listeners", json!([])),
            ],
        ),
    );
    table.insert(
        (Oracle, ObjectStore),
        FieldSpec::new(
            &[],
            vec![
                ("storage_tier", json!("Standard")),
                ("versioning", json!("Disabled")),
            ],
        ),
    );

    // On-premise
    table.insert(
        (OnPremise, VirtualMachine),
        FieldSpec::new(
            &["cpu", "ram_gb", "hypervisor"],
            vec![
                ("disk_gb", json!(50)),
                ("host_server", json!("esxi-01.company.local")),
                ("datastore", json!("datastore1")),
                ("nic", json!("eth0")),
                ("security_groups", json!([])),
            ],
        ),
    );
    table.insert(
        (OnPremise, Database),
        FieldSpec::new(
            &["engine"],
            vec![
                ("version", json!("13.0")),
                ("host_server", json!("db-server-01.company.local")),
                ("max_connections", json!(100)),
                ("data_directory", json!("/var/lib/postgresql/data")),
            ],
        ),
    );
    table.insert(
        (OnPremise, LoadBalancer),
        FieldSpec::new(
            &[],
            vec![
                ("lb_type", json!("nginx")),
                ("listen_port", json!(80)),
                ("algorithm", json!("round_robin")),
                ("host_server", json!("lb-server-01.company.local")),
                ("listeners", json!([])),
            ],
        ),
    );
    table.insert(
        (OnPremise, ObjectStore),
        FieldSpec::new(
            &[],
            vec![
                ("storage_type", json!("nfs")),
                ("capacity_gb", json!(1000)),
                ("protocol_version", json!("4.1")),
                ("permissions", json!("rw")),
            ],
        ),
    );

    table
});

/// Static field rules for every (provider, kind) pair
pub struct ResourceKindCatalog;

impl ResourceKindCatalog {
    /// Field rules for a (provider, kind) pair
    pub fn spec_for(provider: Provider, kind: ResourceKind) -> &'static FieldSpec {
        // Every (provider, kind) combination is inserted above.
        &CATALOG[&(provider, kind)]
    }

    /// Check that every mandatory field is present. Extra fields are ignored.
    pub fn validate(provider: Provider, kind: ResourceKind, config: &ResourceConfig) -> Result<()> {
        let missing_fields = Self::spec_for(provider, kind).missing_fields(config);
        if missing_fields.is_empty() {
            Ok(())
        } else {
            Err(CloudError::Validation {
                provider,
                kind,
                missing_fields,
            })
        }
    }

    /// Validate and return a copy with defaults filled for absent optional fields
    pub fn prepare(
        provider: Provider,
        kind: ResourceKind,
        config: &ResourceConfig,
    ) -> Result<ResourceConfig> {
        Self::validate(provider, kind, config)?;

        let mut prepared = config.clone();
        for (field, default) in &Self::spec_for(provider, kind).optional {
            if !prepared.contains(field) {
                prepared.insert(*field, default.clone());
            }
        }
        Ok(prepared)
    }
}
