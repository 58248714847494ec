//! Oracle Cloud family: compute instances, autonomous databases, load balancers, buckets

use crate::{attach_bucket, attach_db_endpoint, attach_lb_frontend, attach_vm_network};
use skyforge_cloud::{
    FamilyBase, FamilyContext, Profile, Provider, ProviderResourceFamily, Resource,
    ResourceConfig, ResourceKind, SizeSpec, TierBuilder,
};

const LISTENER_PORT: u16 = 1521;
const DEFAULT_IMAGE: &str = "ocid1.image.oc1..canonical-ubuntu-22-04";
const DEFAULT_SUBNET: &str = "ocid1.subnet.oc1..default";

/// Creates OCI resources inside one compartment and region
#[derive(Debug, Clone)]
pub struct OracleFamily {
    base: FamilyBase,
}

impl OracleFamily {
    pub fn new(context: FamilyContext) -> Self {
        Self {
            base: FamilyBase::new(context),
        }
    }
}

impl ProviderResourceFamily for OracleFamily {
    fn provider(&self) -> Provider {
        Provider::Oracle
    }

    fn base(&self) -> &FamilyBase {
        &self.base
    }

    fn resource_type(&self, kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::VirtualMachine => "oci.core.instance",
            ResourceKind::Database => "oci.database.autonomousDatabase",
            ResourceKind::LoadBalancer => "oci.loadbalancer.loadBalancer",
            ResourceKind::ObjectStore => "oci.objectstorage.bucket",
        }
    }

    fn create_virtual_machine(&self, name: &str, config: ResourceConfig) -> Resource {
        let mut resource = self.draft(ResourceKind::VirtualMachine, name, config);
        attach_vm_network(&mut resource);
        resource
    }

    fn create_database(&self, name: &str, config: ResourceConfig) -> Resource {
        let mut resource = self.draft(ResourceKind::Database, name, config);
        attach_db_endpoint(&mut resource, LISTENER_PORT);
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

/// Spells tier sizes as flexible shapes with OCPU and memory counts.
///
/// One OCPU is two vCPUs.
#[derive(Debug, Default)]
pub struct OracleTierBuilder {
    config: ResourceConfig,
}

impl TierBuilder for OracleTierBuilder {
    fn provider(&self) -> Provider {
        Provider::Oracle
    }

    fn reset(&mut self) {
        self.config = ResourceConfig::new();
    }

    fn set_identity(&mut self, name: &str, region: &str) {
        self.config.insert("display_name", name);
        self.config.insert("region", region);
    }

    fn set_size(&mut self, size: &SizeSpec) {
        let shape = match size.profile {
            Profile::Compute => "VM.Optimized3.Flex",
            Profile::General | Profile::Memory => "VM.Standard.E4.Flex",
        };
        self.config.insert("shape", shape);
        self.config.insert("ocpus", (size.vcpus / 2).max(1));
        self.config.insert("memory_in_gbs", size.memory_gb);
    }

    fn set_image_and_network(&mut self) {
        self.config.insert("image_id", DEFAULT_IMAGE);
        self.config.insert("subnet_id", DEFAULT_SUBNET);
    }

    fn build(&mut self) -> ResourceConfig {
        std::mem::take(&mut self.config)
    }
}
