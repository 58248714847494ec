//! Skyforge provider families
//!
//! One module per provider, each implementing
//! [`ProviderResourceFamily`] and [`TierBuilder`] from `skyforge-cloud`.
//!
//! # Supported Providers
//!
//! - **AWS**: EC2, RDS, ALB, S3
//! - **Azure**: Virtual Machines, Azure SQL / PostgreSQL, Load Balancer, Storage Accounts
//! - **GCP**: Compute Engine, Cloud SQL, Cloud Load Balancing, Cloud Storage
//! - **Oracle**: OCI Compute, Autonomous Database, Load Balancer, Object Storage
//! - **On-Premise**: hypervisor VMs, database hosts, nginx/haproxy, NFS shares
//!
//! # Example
//!
//! ```
//! use skyforge_cloud::{FamilyContext, Provider, ResourceConfig, ResourceKind};
//! use skyforge_providers::{build_config, create_family};
//!
//! let config = build_config("large", Some("general"), Provider::Aws, "web", "us-east-1",
//!     &ResourceConfig::new())?;
//! let family = create_family(Provider::Aws, FamilyContext::new("us-east-1", "vpc-main"));
//! let vm = family.create(ResourceKind::VirtualMachine, "web", &config)?;
//! assert_eq!(vm.attribute_str("instance_type"), Some("m6i.2xlarge"));
//! # Ok::<(), skyforge_cloud::CloudError>(())
//! ```

pub mod aws;
pub mod azure;
pub mod gcp;
pub mod onprem;
pub mod oracle;

pub use aws::{AwsFamily, AwsTierBuilder};
pub use azure::{AzureFamily, AzureTierBuilder};
pub use gcp::{GcpFamily, GcpTierBuilder};
pub use onprem::{OnPremiseFamily, OnPremiseTierBuilder};
pub use oracle::{OracleFamily, OracleTierBuilder};

use serde_json::json;
use skyforge_cloud::{
    FamilyContext, Profile, Provider, ProviderResourceFamily, Resource, ResourceConfig,
    ResourceKind, Result, Tier, TierBuilder, TierDirector, naming,
};

/// Family for `provider`, placing resources according to `context`
pub fn create_family(
    provider: Provider,
    context: FamilyContext,
) -> Box<dyn ProviderResourceFamily> {
    match provider {
        Provider::Aws => Box::new(AwsFamily::new(context)),
        Provider::Azure => Box::new(AzureFamily::new(context)),
        Provider::Gcp => Box::new(GcpFamily::new(context)),
        Provider::Oracle => Box::new(OracleFamily::new(context)),
        Provider::OnPremise => Box::new(OnPremiseFamily::new(context)),
    }
}

pub fn tier_builder(provider: Provider) -> Box<dyn TierBuilder> {
    match provider {
        Provider::Aws => Box::new(AwsTierBuilder::default()),
        Provider::Azure => Box::new(AzureTierBuilder::default()),
        Provider::Gcp => Box::new(GcpTierBuilder::default()),
        Provider::Oracle => Box::new(OracleTierBuilder::default()),
        Provider::OnPremise => Box::new(OnPremiseTierBuilder::default()),
    }
}

/// Virtual machine configuration for a tier and profile on `provider`.
///
/// `profile` defaults to general. Unknown tier or profile names fail with a
/// configuration error.
pub fn build_config(
    tier: &str,
    profile: Option<&str>,
    provider: Provider,
    name: &str,
    region: &str,
    extra: &ResourceConfig,
) -> Result<ResourceConfig> {
    let tier: Tier = tier.parse()?;
    let profile: Profile = profile.map(str::parse).transpose()?.unwrap_or_default();

    let mut builder = tier_builder(provider);
    Ok(TierDirector::new().construct(builder.as_mut(), name, region, tier, profile, extra))
}

// Secondary identifiers under the attribute names the clone rules expect.

pub(crate) fn attach_vm_network(resource: &mut Resource) {
    resource.set_attribute("private_ip", naming::private_ip());
    resource.set_attribute("public_ip", "unassigned");
}

pub(crate) fn attach_db_endpoint(resource: &mut Resource, port: u16) {
    let endpoint = naming::host_name(
        resource.provider,
        ResourceKind::Database,
        &resource.name,
        &resource.region,
    );
    resource.set_attribute("endpoint", endpoint);
    resource.set_attribute("port", port);
}

pub(crate) fn attach_lb_frontend(resource: &mut Resource) {
    let dns_name = naming::host_name(
        resource.provider,
        ResourceKind::LoadBalancer,
        &resource.name,
        &resource.region,
    );
    resource.set_attribute("dns_name", dns_name);
    if resource.attribute("targets").is_none() {
        resource.set_attribute("targets", json!([]));
    }
}

pub(crate) fn attach_bucket(resource: &mut Resource) {
    resource.set_attribute("bucket_name", naming::bucket_name(&resource.name));
    resource.set_attribute("objects", json!({}));
}

/// Default port for a database engine name
pub(crate) fn engine_port(engine: Option<&str>) -> u16 {
    match engine.map(str::to_ascii_lowercase).as_deref() {
        Some("mysql") | Some("mariadb") => 3306,
        Some("sqlserver") | Some("mssql") => 1433,
        Some("oracle") => 1521,
        _ => 5432,
    }
}
