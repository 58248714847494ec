//! Provider and resource kind enumerations
//!
//! Both are closed sets. Adding a provider is a schema change: a new variant,
//! a catalog entry and a family implementation.

use crate::error::{CloudError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported infrastructure providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provider {
    Aws,
    Azure,
    Gcp,
    #[serde(alias = "oci")]
    Oracle,
    #[serde(alias = "onprem")]
    OnPremise,
}

impl Provider {
    pub const ALL: [Provider; 5] = [
        Provider::Aws,
        Provider::Azure,
        Provider::Gcp,
        Provider::Oracle,
        Provider::OnPremise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::Azure => "azure",
            Provider::Gcp => "gcp",
            Provider::Oracle => "oracle",
            Provider::OnPremise => "on-premise",
        }
    }

    /// Human-readable name for CLI output
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::Aws => "Amazon Web Services",
            Provider::Azure => "Microsoft Azure",
            Provider::Gcp => "Google Cloud Platform",
            Provider::Oracle => "Oracle Cloud Infrastructure",
            Provider::OnPremise => "On-Premise Datacenter",
        }
    }

    pub fn default_region(&self) -> &'static str {
        match self {
            Provider::Aws => "us-east-1",
            Provider::Azure => "eastus",
            Provider::Gcp => "us-central1",
            Provider::Oracle => "us-ashburn-1",
            Provider::OnPremise => "datacenter-1",
        }
    }

    /// Attribute name under which a family records its network namespace
    pub fn namespace_key(&self) -> &'static str {
        match self {
            Provider::Aws => "vpc_id",
            Provider::Azure => "resource_group",
            Provider::Gcp => "project_id",
            Provider::Oracle => "compartment_id",
            Provider::OnPremise => "datacenter",
        }
    }

    pub fn default_namespace(&self) -> &'static str {
        match self {
            Provider::Aws => "vpc-default",
            Provider::Azure => "rg-default",
            Provider::Gcp => "my-gcp-project",
            Provider::Oracle => "ocid1.compartment.oc1..default",
            Provider::OnPremise => "dc-main",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aws" => Ok(Provider::Aws),
            "azure" => Ok(Provider::Azure),
            "gcp" | "google" => Ok(Provider::Gcp),
            "oracle" | "oci" => Ok(Provider::Oracle),
            "on-premise" | "onpremise" | "onprem" => Ok(Provider::OnPremise),
            _ => Err(CloudError::invalid_value("provider", s)),
        }
    }
}

/// Kinds of resources every provider family can create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    #[serde(alias = "vm")]
    VirtualMachine,
    #[serde(alias = "db")]
    Database,
    #[serde(alias = "lb")]
    LoadBalancer,
    #[serde(alias = "storage")]
    ObjectStore,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 4] = [
        ResourceKind::VirtualMachine,
        ResourceKind::Database,
        ResourceKind::LoadBalancer,
        ResourceKind::ObjectStore,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::VirtualMachine => "virtual-machine",
            ResourceKind::Database => "database",
            ResourceKind::LoadBalancer => "load-balancer",
            ResourceKind::ObjectStore => "object-store",
        }
    }

    /// Passive kinds have no running/stopped distinction, only `available`.
    pub fn is_passive(&self) -> bool {
        matches!(self, ResourceKind::ObjectStore)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "virtual-machine" | "vm" => Ok(ResourceKind::VirtualMachine),
            "database" | "db" => Ok(ResourceKind::Database),
            "load-balancer" | "loadbalancer" | "lb" => Ok(ResourceKind::LoadBalancer),
            "object-store" | "storage" | "bucket" => Ok(ResourceKind::ObjectStore),
            _ => Err(CloudError::invalid_value("kind", s)),
        }
    }
}
