//! Identifier, address and host name generation
//!
//! Families use these at creation time and the clone capability uses them
//! again when regenerating identity fields, so both produce the same shapes.

use crate::kind::{Provider, ResourceKind};
use uuid::Uuid;

const ID_TOKEN_LEN: usize = 16;
const HOST_TOKEN_LEN: usize = 8;

/// Random lowercase hex token of at most 32 characters
pub fn token(len: usize) -> String {
    let mut hex = Uuid::new_v4().simple().to_string();
    hex.truncate(len.min(32));
    hex
}

pub fn id_prefix(provider: Provider, kind: ResourceKind) -> &'static str {
    use Provider::*;
    use ResourceKind::*;

    match (provider, kind) {
        (Aws, VirtualMachine) => "i",
        (Aws, Database) => "db",
        (Aws, LoadBalancer) => "alb",
        (Aws, ObjectStore) => "s3",
        (Azure, VirtualMachine) => "az-vm",
        (Azure, Database) => "az-sql",
        (Azure, LoadBalancer) => "az-lb",
        (Azure, ObjectStore) => "az-blob",
        (Gcp, VirtualMachine) => "gcp-vm",
        (Gcp, Database) => "gcp-db",
        (Gcp, LoadBalancer) => "gcp-lb",
        (Gcp, ObjectStore) => "gcp-storage",
        (Oracle, VirtualMachine) => "oci-vm",
        (Oracle, Database) => "oci-db",
        (Oracle, LoadBalancer) => "oci-lb",
        (Oracle, ObjectStore) => "oci-bucket",
        (OnPremise, VirtualMachine) => "onprem-vm",
        (OnPremise, Database) => "onprem-db",
        (OnPremise, LoadBalancer) => "onprem-lb",
        (OnPremise, ObjectStore) => "onprem-share",
    }
}

/// Fresh resource id, e.g. `i-3f9c0a7d51e24b68`
pub fn resource_id(provider: Provider, kind: ResourceKind) -> String {
    format!("{}-{}", id_prefix(provider, kind), token(ID_TOKEN_LEN))
}

/// Lowercase DNS-safe form of a display name
pub fn slug(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "resource".to_string()
    } else {
        slug.to_string()
    }
}

fn domain(provider: Provider, kind: ResourceKind, region: &str) -> String {
    use Provider::*;
    use ResourceKind::*;

    match (provider, kind) {
        (Aws, LoadBalancer) => format!("{region}.elb.amazonaws.com"),
        (Aws, _) => format!("{region}.rds.amazonaws.com"),
        (Azure, LoadBalancer) => format!("{region}.cloudapp.azure.com"),
        (Azure, _) => "postgres.database.azure.com".to_string(),
        (Gcp, LoadBalancer) => format!("{region}.lb.googleusercontent.com"),
        (Gcp, _) => format!("{region}.sql.goog"),
        (Oracle, LoadBalancer) => format!("{region}.lb.oraclecloud.com"),
        (Oracle, _) => format!("{region}.db.oraclecloud.com"),
        (OnPremise, LoadBalancer) => "lb.company.local".to_string(),
        (OnPremise, _) => "db.company.local".to_string(),
    }
}

/// Globally unique host name for a database endpoint or load balancer
pub fn host_name(provider: Provider, kind: ResourceKind, name: &str, region: &str) -> String {
    format!(
        "{}-{}.{}",
        slug(name),
        token(HOST_TOKEN_LEN),
        domain(provider, kind, region)
    )
}

/// Globally unique bucket or share name
pub fn bucket_name(name: &str) -> String {
    format!("{}-{}", slug(name), token(HOST_TOKEN_LEN))
}

fn random_octets() -> [u8; 3] {
    let bytes = Uuid::new_v4().into_bytes();
    // Avoid .0 and .255 in the last octet
    [bytes[0], bytes[1], bytes[2].clamp(1, 254)]
}

/// Private address inside the family's network namespace
pub fn private_ip() -> String {
    let [a, b, c] = random_octets();
    format!("10.{a}.{b}.{c}")
}

/// Public address from the provider's (simulated) pool
pub fn public_ip(provider: Provider) -> String {
    let first = match provider {
        Provider::Aws => 54,
        Provider::Azure => 20,
        Provider::Gcp => 34,
        Provider::Oracle => 129,
        Provider::OnPremise => 198,
    };
    let [a, b, c] = random_octets();
    format!("{first}.{a}.{b}.{c}")
}

/// Fresh identifier keeping the prefix of `previous` (text up to the first `-`).
///
/// Used to regenerate references such as security group ids: `sg-1a2b` becomes
/// `sg-<new token>`.
pub fn regenerate_reference(previous: &str) -> String {
    match previous.split_once('-') {
        Some((prefix, _)) if !prefix.is_empty() => format!("{prefix}-{}", token(HOST_TOKEN_LEN)),
        _ => token(HOST_TOKEN_LEN),
    }
}
