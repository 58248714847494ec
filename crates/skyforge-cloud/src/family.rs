//! Provider resource family abstraction
//!
//! One family per provider creates every resource kind for that provider.
//! Resources created by the same family instance share its region, network
//! namespace and deployment id.

use crate::catalog::ResourceKindCatalog;
use crate::config::ResourceConfig;
use crate::error::Result;
use crate::kind::{Provider, ResourceKind};
use crate::naming;
use crate::resource::Resource;
use serde::{Deserialize, Serialize};

/// Where a family places the resources it creates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyContext {
    pub region: String,

    /// Provider network namespace (VPC id, resource group, project, ...)
    pub namespace: String,
}

impl FamilyContext {
    pub fn new(region: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            namespace: namespace.into(),
        }
    }

    /// Provider defaults for region and namespace
    pub fn for_provider(provider: Provider) -> Self {
        Self::new(provider.default_region(), provider.default_namespace())
    }
}

/// State every family implementation carries
#[derive(Debug, Clone)]
pub struct FamilyBase {
    pub context: FamilyContext,
    pub deployment_id: String,
}

impl FamilyBase {
    pub fn new(context: FamilyContext) -> Self {
        Self {
            context,
            deployment_id: format!("dep-{}", naming::token(12)),
        }
    }
}

/// Abstract factory for one provider's resources
///
/// Implementors supply the four per-kind constructors; [`create`] validates
/// the configuration against the catalog and fills defaults before calling
/// them. Families never persist what they create.
///
/// [`create`]: ProviderResourceFamily::create
pub trait ProviderResourceFamily: Send + Sync {
    fn provider(&self) -> Provider;

    fn base(&self) -> &FamilyBase;

    /// Provider-native type label for a kind
    fn resource_type(&self, kind: ResourceKind) -> &'static str;

    fn create_virtual_machine(&self, name: &str, config: ResourceConfig) -> Resource;

    fn create_database(&self, name: &str, config: ResourceConfig) -> Resource;

    fn create_load_balancer(&self, name: &str, config: ResourceConfig) -> Resource;

    fn create_object_store(&self, name: &str, config: ResourceConfig) -> Resource;

    fn context(&self) -> &FamilyContext {
        &self.base().context
    }

    fn deployment_id(&self) -> &str {
        &self.base().deployment_id
    }

    /// New `creating` resource stamped with the family's shared identity
    /// conventions and carrying every config field as an attribute.
    fn draft(&self, kind: ResourceKind, name: &str, config: ResourceConfig) -> Resource {
        let provider = self.provider();
        let context = self.context();

        if let Some(region) = config.get_str("region").filter(|r| *r != context.region) {
            tracing::warn!(
                "{} family in {} ignores region '{}' requested for {}",
                provider,
                context.region,
                region,
                name
            );
        }

        let mut resource = Resource::new(
            provider,
            kind,
            name,
            context.region.clone(),
            self.resource_type(kind),
        );
        resource.attributes = config.into_fields();
        resource.set_attribute("region", context.region.clone());
        resource.set_attribute(provider.namespace_key(), context.namespace.clone());
        resource.set_attribute("deployment_id", self.deployment_id().to_string());
        resource
    }

    /// Validate, apply catalog defaults and build a resource of `kind`
    fn create(&self, kind: ResourceKind, name: &str, config: &ResourceConfig) -> Result<Resource> {
        let prepared = ResourceKindCatalog::prepare(self.provider(), kind, config)?;

        let resource = match kind {
            ResourceKind::VirtualMachine => self.create_virtual_machine(name, prepared),
            ResourceKind::Database => self.create_database(name, prepared),
            ResourceKind::LoadBalancer => self.create_load_balancer(name, prepared),
            ResourceKind::ObjectStore => self.create_object_store(name, prepared),
        };

        tracing::debug!(
            "Created {} {} '{}' ({}) in {}",
            resource.provider,
            resource.kind,
            resource.name,
            resource.id,
            resource.region
        );
        Ok(resource)
    }
}
