//! AWS family: EC2 instances, RDS databases, application load balancers, S3 buckets

use crate::{attach_bucket, attach_db_endpoint, attach_lb_frontend, attach_vm_network, engine_port};
use skyforge_cloud::{
    FamilyBase, FamilyContext, Profile, Provider, ProviderResourceFamily, Resource,
    ResourceConfig, ResourceKind, SizeSpec, TierBuilder,
};

const DEFAULT_AMI: &str = "ami-0c02fb55956c7d316";

/// Creates AWS resources inside one VPC and region
#[derive(Debug, Clone)]
pub struct AwsFamily {
    base: FamilyBase,
}

impl AwsFamily {
    pub fn new(context: FamilyContext) -> Self {
        Self {
            base: FamilyBase::new(context),
        }
    }
}

impl ProviderResourceFamily for AwsFamily {
    fn provider(&self) -> Provider {
        Provider::Aws
    }

    fn base(&self) -> &FamilyBase {
        &self.base
    }

    fn resource_type(&self, kind: ResourceKind) -> &'static str {
        match kind {
            ResourceKind::VirtualMachine => "AWS::EC2::Instance",
            ResourceKind::Database => "AWS::RDS::DBInstance",
            ResourceKind::LoadBalancer => "AWS::ElasticLoadBalancingV2::LoadBalancer",
            ResourceKind::ObjectStore => "AWS::S3::Bucket",
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

/// EC2 size suffix for a vCPU count (`large` = 2 vCPU, `xlarge` = 4, `Nxlarge` = 4N)
fn size_suffix(vcpus: u32) -> String {
    match vcpus {
        0..=1 => "medium".to_string(),
        2..=3 => "large".to_string(),
        4..=7 => "xlarge".to_string(),
        n => format!("{}xlarge", n / 4),
    }
}

/// Spells tier sizes as EC2 instance types
#[derive(Debug, Default)]
pub struct AwsTierBuilder {
    config: ResourceConfig,
}

impl TierBuilder for AwsTierBuilder {
    fn provider(&self) -> Provider {
        Provider::Aws
    }

    fn reset(&mut self) {
        self.config = ResourceConfig::new();
    }

    fn set_identity(&mut self, name: &str, region: &str) {
        self.config.insert("name", name);
        self.config.insert("region", region);
    }

    fn set_size(&mut self, size: &SizeSpec) {
        let family = match size.profile {
            Profile::General => "m6i",
            Profile::Memory => "r6i",
            Profile::Compute => "c6i",
        };
        self.config.insert(
            "instance_type",
            format!("{family}.{}", size_suffix(size.vcpus)),
        );
    }

    fn set_image_and_network(&mut self) {
        self.config.insert("ami", DEFAULT_AMI);
        self.config.insert("subnet_id", "default");
    }

    fn build(&mut self) -> ResourceConfig {
        std::mem::take(&mut self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use skyforge_cloud::{ResourceStatus, Tier, TierDirector};

    fn family() -> AwsFamily {
        AwsFamily::new(FamilyContext::new("us-east-1", "vpc-main"))
    }

    #[test]
    fn test_instance_types_per_tier() {
        let director = TierDirector::new();
        let mut builder = AwsTierBuilder::default();
        let cases = [
            (Tier::Small, Profile::General, "m6i.large"),
            (Tier::Medium, Profile::Memory, "r6i.xlarge"),
            (Tier::Large, Profile::General, "m6i.2xlarge"),
            (Tier::Xlarge, Profile::Compute, "c6i.4xlarge"),
        ];

        for (tier, profile, expected) in cases {
            let config = director.construct(
                &mut builder,
                "web",
                "us-east-1",
                tier,
                profile,
                &ResourceConfig::new(),
            );
            assert_eq!(config.get_str("instance_type"), Some(expected));
            assert_eq!(config.get_str("ami"), Some(DEFAULT_AMI));
        }
    }

    #[test]
    fn test_vm_carries_family_identity() {
        let family = family();
        let config = ResourceConfig::new()
            .with("instance_type", "t3.micro")
            .with("ami", "ami-123");

        let vm = family
            .create(ResourceKind::VirtualMachine, "web-01", &config)
            .unwrap();
        assert!(vm.id.starts_with("i-"));
        assert_eq!(vm.status, ResourceStatus::Creating);
        assert_eq!(vm.resource_type, "AWS::EC2::Instance");
        assert_eq!(vm.attribute_str("vpc_id"), Some("vpc-main"));
        assert_eq!(vm.attribute_str("region"), Some("us-east-1"));
        assert_eq!(vm.attribute_str("deployment_id"), Some(family.deployment_id()));
        assert_eq!(vm.attribute_str("public_ip"), Some("unassigned"));
        assert!(vm.attribute_str("private_ip").unwrap().starts_with("10."));
        assert_eq!(vm.attribute("root_volume_gb"), Some(&json!(20)));
    }

    #[test]
    fn test_database_endpoint_and_port() {
        let config = ResourceConfig::new()
            .with("engine", "mysql")
            .with("instance_class", "db.t3.micro");

        let db = family()
            .create(ResourceKind::Database, "orders", &config)
            .unwrap();
        assert!(db.id.starts_with("db-"));
        assert_eq!(db.attribute("port"), Some(&json!(3306)));
        let endpoint = db.attribute_str("endpoint").unwrap();
        assert!(endpoint.starts_with("orders-"));
        assert!(endpoint.ends_with(".us-east-1.rds.amazonaws.com"));
    }

    #[test]
    fn test_load_balancer_requires_lb_type() {
        let err = family()
            .create(ResourceKind::LoadBalancer, "edge", &ResourceConfig::new())
            .unwrap_err();
        assert!(err.to_string().contains("lb_type"));

        let lb = family()
            .create(
                ResourceKind::LoadBalancer,
                "edge",
                &ResourceConfig::new().with("lb_type", "application"),
            )
            .unwrap();
        assert_eq!(lb.attribute("targets"), Some(&json!([])));
        assert!(lb.attribute_str("dns_name").is_some());
    }

    #[test]
    fn test_bucket_is_created_empty() {
        let bucket = family()
            .create(ResourceKind::ObjectStore, "assets", &ResourceConfig::new())
            .unwrap();
        assert!(bucket.id.starts_with("s3-"));
        assert_eq!(bucket.attribute("objects"), Some(&json!({})));
        assert_eq!(bucket.attribute_str("storage_class"), Some("STANDARD"));
    }
}
