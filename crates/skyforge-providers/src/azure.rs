//! Azure family: virtual machines, managed databases, load balancers, storage accounts

use crate::{attach_bucket, attach_db_endpoint, attach_lb_frontend, attach_vm_network, engine_port};
use skyforge_cloud::{
    FamilyBase, FamilyContext, Profile, Provider, ProviderResourceFamily, Resource,
    ResourceConfig, ResourceKind, SizeSpec, TierBuilder,
};

const DEFAULT_IMAGE: &str = "Canonical:0001-com-ubuntu-server-jammy:22_04-lts-gen2:latest";

/// Creates Azure resources inside one resource group and location
#[derive(Debug, Clone)]
pub struct AzureFamily {
    base: FamilyBase,
}

impl AzureFamily {
    pub fn new(context: FamilyContext) -> Self {
        Self {
            base: FamilyBase::new(context),
        }
    }
}

impl ProviderResourceFamily for AzureFamily {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    fn base(&self) -> &FamilyBase {
        &self.base
    }

    fn resource_type(&self, kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::VirtualMachine => "Microsoft.Compute/virtualMachines",
            ResourceKind::Database => "Microsoft.DBforPostgreSQL/flexibleServers",
            ResourceKind::LoadBalancer => "Microsoft.Network/loadBalancers",
            ResourceKind::ObjectStore => "Microsoft.Storage/storageAccounts",
        }
    }

    fn create_virtual_machine(&self, name: &str, config: ResourceConfig) -> Resource {
        let mut resource = self.draft(ResourceKind::VirtualMachine, name, config);
        attach_vm_network(&mut resource);
        resource
    }

    fn create_database(&self, name: &str, config: ResourceConfig) -> Resource {
        let port = engine_port(config.get_str("engine"));
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
        resource
    }
}

/// Spells tier sizes as Azure VM sizes (`Standard_D4s_v5` and friends)
#[derive(Debug, Default)]
pub struct AzureTierBuilder {
    config: ResourceConfig,
}

impl TierBuilder for AzureTierBuilder {
    fn provider(&self) -> Provider {
        Provider::Azure
    }

    fn reset(&mut self) {
        self.config = ResourceConfig::new();
    }

    fn set_identity(&mut self, name: &str, region: &str) {
        self.config.insert("name", name);
        self.config.insert("location", region);
    }

    fn set_size(&mut self, size: &SizeSpec) {
        let vcpus = size.vcpus;
        let vm_size = match size.profile {
            Profile::General => format!("Standard_D{vcpus}s_v5"),
            Profile::Memory => format!("Standard_E{vcpus}s_v5"),
            Profile::Compute => format!("Standard_F{vcpus}s_v2"),
        };
        self.config.insert("vm_size", vm_size);
    }

    fn set_image_and_network(&mut self) {
        self.config.insert("image", DEFAULT_IMAGE);
        self.config.insert("vnet_name", "default-vnet");
        self.config.insert("subnet_name", "default");
    }

    fn build(&mut self) -> ResourceConfig {
        std::mem::take(&mut self.config)
    }
}
