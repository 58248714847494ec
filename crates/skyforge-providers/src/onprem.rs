//! On-premise family: hypervisor VMs, database hosts, software load balancers, NFS shares

use crate::{attach_bucket, attach_db_endpoint, attach_lb_frontend, attach_vm_network, engine_port};
use skyforge_cloud::{
    FamilyBase, FamilyContext, Provider, ProviderResourceFamily, Resource, ResourceConfig,
    ResourceKind, SizeSpec, TierBuilder, naming,
};

/// Creates resources in one datacenter
#[derive(Debug, Clone)]
pub struct OnPremiseFamily {
    base: FamilyBase,
}

impl OnPremiseFamily {
    pub fn new(context: FamilyContext) -> Self {
        Self {
            base: FamilyBase::new(context),
        }
    }
}

impl ProviderResourceFamily for OnPremiseFamily {
    fn provider(&self) -> Provider {
        Provider::OnPremise
    }

    fn base(&self) -> &FamilyBase {
        &self.base
    }

    fn resource_type(&self, kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::VirtualMachine => "onprem.vm",
            ResourceKind::Database => "onprem.database",
            ResourceKind::LoadBalancer => "onprem.loadbalancer",
            ResourceKind::ObjectStore => "onprem.share",
        }
    }

    fn create_virtual_machine(&self, name: &str, config: ResourceConfig) -> Resource {
        let mut resource = self.draft(ResourceKind::VirtualMachine, name, config);
        let hostname = format!(
            "{}.{}.company.local",
            naming::slug(&resource.name),
            naming::slug(&self.context().namespace)
        );
        resource.set_attribute("hostname", hostname);
        attach_vm_network(&mut resource);
        resource
    }

    fn create_database(&self, name: &str, config: ResourceConfig) -> Resource {
        // An explicit port wins over the engine default
        let port = config
            .get_as::<u16>("port")
            .unwrap_or_else(|| engine_port(config.get_str("engine")));
        let mut resource = self.draft(ResourceKind::Database, name, config);
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
        if resource.attribute("mount_point").is_none() {
            let mount_point = format!("/mnt/{}", naming::slug(&resource.name));
            resource.set_attribute("mount_point", mount_point);
        }
        resource
    }
}

/// Spells tier sizes as hypervisor CPU and RAM settings
#[derive(Debug, Default)]
pub struct OnPremiseTierBuilder {
    config: ResourceConfig,
}

impl TierBuilder for OnPremiseTierBuilder {
    fn provider(&self) -> Provider {
        Provider::OnPremise
    }

    fn reset(&mut self) {
        self.config = ResourceConfig::new();
    }

    fn set_identity(&mut self, name: &str, region: &str) {
        self.config.insert("name", name);
        self.config.insert("region", region);
    }

    fn set_size(&mut self, size: &SizeSpec) {
        self.config.insert("cpu", size.vcpus);
        self.config.insert("ram_gb", size.memory_gb);
    }

    fn set_image_and_network(&mut self) {
        self.config.insert("hypervisor", "vmware");
        self.config.insert("template", "ubuntu-22.04-template");
        self.config.insert("nic", "eth0");
    }

    fn build(&mut self) -> ResourceConfig {
        std::mem::take(&mut self.config)
    }
}
