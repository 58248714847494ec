//! GCP family: Compute Engine, Cloud SQL, Cloud Load Balancing, Cloud Storage

use crate::{attach_bucket, attach_db_endpoint, attach_lb_frontend, attach_vm_network, engine_port};
use skyforge_cloud::{
    FamilyBase, FamilyContext, Profile, Provider, ProviderResourceFamily, Resource,
    ResourceConfig, ResourceKind, SizeSpec, TierBuilder,
};

/// Creates GCP resources inside one project and region
#[derive(Debug, Clone)]
pub struct GcpFamily {
    base: FamilyBase,
}

impl GcpFamily {
    pub fn new(context: FamilyContext) -> Self {
        Self {
            base: FamilyBase::new(context),
        }
    }

    /// Default zone inside the family's region
    pub fn zone(&self) -> String {
        format!("{}-a", self.context().region)
    }
}

impl ProviderResourceFamily for GcpFamily {
    fn provider(&self) -> Provider {
        Provider::Gcp
    }

    fn base(&self) -> &FamilyBase {
        &self.base
    }

    fn resource_type(&self, kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::VirtualMachine => "gcp.compute.instance",
            ResourceKind::Database => "gcp.cloudsql.instance",
            ResourceKind::LoadBalancer => "gcp.compute.forwardingRule",
            ResourceKind::ObjectStore => "gcp.storage.bucket",
        }
    }

    fn create_virtual_machine(&self, name: &str, config: ResourceConfig) -> Resource {
        let zone = config
            .get_str("zone")
            .map(str::to_string)
            .unwrap_or_else(|| self.zone());
        let mut resource = self.draft(ResourceKind::VirtualMachine, name, config);
        resource.set_attribute("zone", zone);
        attach_vm_network(&mut resource);
        resource
    }

    fn create_database(&self, name: &str, config: ResourceConfig) -> Resource {
        let port = engine_port(config.get_str("engine"));
        let mut resource = self.draft(ResourceKind::Database, name, config);
        // project:region:instance, as Cloud SQL connectors expect
        let connection_name = format!(
            "{}:{}:{}",
            self.context().namespace,
            self.context().region,
            resource.name
        );
        resource.set_attribute("connection_name", connection_name);
        attach_db_endpoint(&mut resource, port);
        resource
    }

    fn create_load_balancer(&self, name: &str, config: ResourceConfig) -> Resource {
        let mut resource = self.draft(ResourceKind::LoadBalancer, name, config);
        attach_lb_frontend(&mut resource);
        resource
    }

    fn create_object_store(&self, name: &str, config: ResourceConfig) -> Resource {
        let mut resource = self.draft(ResourceKind::ObjectStore, name, config);
        attach_bucket(&mut resource);
        resource
    }
}

/// Spells tier sizes as N2 machine types
#[derive(Debug, Default)]
pub struct GcpTierBuilder {
    config: ResourceConfig,
}

impl TierBuilder for GcpTierBuilder {
    fn provider(&self) -> Provider {
        Provider::Gcp
    }

    fn reset(&mut self) {
        self.config = ResourceConfig::new();
    }

    fn set_identity(&mut self, name: &str, region: &str) {
        self.config.insert("name", name);
        self.config.insert("region", region);
        self.config.insert("zone", format!("{region}-a"));
    }

    fn set_size(&mut self, size: &SizeSpec) {
        let series = match size.profile {
            Profile::General => "standard",
            Profile::Memory => "highmem",
            Profile::Compute => "highcpu",
        };
        self.config
            .insert("machine_type", format!("n2-{series}-{}", size.vcpus));
    }

    fn set_image_and_network(&mut self) {
        self.config.insert("image_family", "debian-12");
        self.config.insert("network", "default");
    }

    fn build(&mut self) -> ResourceConfig {
        std::mem::take(&mut self.config)
    }
}
