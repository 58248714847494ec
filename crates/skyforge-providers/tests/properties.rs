//! Property-based tests across every provider family
//!
//! Covers creation, catalog validation, tier construction and cloning with
//! randomized names, tiers and configurations.

use proptest::prelude::*;
use serde_json::json;
use skyforge_cloud::{
    Cloneable, FamilyContext, Profile, Provider, ResourceConfig, ResourceKind,
    ResourceKindCatalog, ResourceStatus, Tier,
};
use skyforge_providers::{build_config, create_family};

fn arb_provider() -> impl Strategy<Value = Provider> {
    prop::sample::select(Provider::ALL.to_vec())
}

fn arb_kind() -> impl Strategy<Value = ResourceKind> {
    prop::sample::select(ResourceKind::ALL.to_vec())
}

fn arb_tier() -> impl Strategy<Value = Tier> {
    prop::sample::select(Tier::ALL.to_vec())
}

fn arb_profile() -> impl Strategy<Value = Profile> {
    prop::sample::select(Profile::ALL.to_vec())
}

/// Config with every mandatory field of (provider, kind) filled in
fn complete_config(provider: Provider, kind: ResourceKind) -> ResourceConfig {
    ResourceKindCatalog::spec_for(provider, kind)
        .mandatory
        .iter()
        .map(|field| (field.to_string(), json!("value")))
        .collect()
}

proptest! {
    /// create returns a fresh resource of the requested kind and provider
    #[test]
    fn create_returns_creating_resource(
        provider in arb_provider(),
        kind in arb_kind(),
        name in "[a-z][a-z0-9-]{0,30}",
    ) {
        let family = create_family(provider, FamilyContext::for_provider(provider));
        let resource = family.create(kind, &name, &complete_config(provider, kind)).unwrap();

        prop_assert_eq!(resource.status, ResourceStatus::Creating);
        prop_assert_eq!(resource.kind, kind);
        prop_assert_eq!(resource.provider, provider);
        prop_assert_eq!(&resource.name, &name);
        prop_assert!(resource.metadata.is_original());
        prop_assert_eq!(resource.metadata.clone_count, 0);
    }

    /// Validation is a pure function of its input
    #[test]
    fn validation_is_idempotent(
        provider in arb_provider(),
        kind in arb_kind(),
        keep in prop::collection::vec(any::<bool>(), 4),
    ) {
        let spec = ResourceKindCatalog::spec_for(provider, kind);
        let config: ResourceConfig = spec
            .mandatory
            .iter()
            .zip(keep.iter().cycle())
            .filter(|(_, keep)| **keep)
            .map(|(field, _)| (field.to_string(), json!(1)))
            .collect();

        let first = ResourceKindCatalog::validate(provider, kind, &config).map_err(|e| e.to_string());
        let second = ResourceKindCatalog::validate(provider, kind, &config).map_err(|e| e.to_string());
        prop_assert_eq!(first.clone(), second);
        prop_assert_eq!(first.is_ok(), spec.missing_fields(&config).is_empty());
    }

    /// Same inputs give the same tier configuration
    #[test]
    fn tier_construction_is_deterministic(
        provider in arb_provider(),
        tier in arb_tier(),
        profile in arb_profile(),
    ) {
        let extra = ResourceConfig::new();
        let region = provider.default_region();
        let first = build_config(&tier.to_string(), Some(&profile.to_string()), provider, "app", region, &extra).unwrap();
        let second = build_config(&tier.to_string(), Some(&profile.to_string()), provider, "app", region, &extra).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.get_as::<u32>("vcpus"), Some(tier.base_size().0));
    }

    /// Tier configurations always pass the provider's VM validation
    #[test]
    fn tier_configs_are_valid_vms(
        provider in arb_provider(),
        tier in arb_tier(),
        profile in arb_profile(),
    ) {
        let config = build_config(
            &tier.to_string(),
            Some(&profile.to_string()),
            provider,
            "app",
            provider.default_region(),
            &ResourceConfig::new(),
        ).unwrap();
        prop_assert!(ResourceKindCatalog::validate(provider, ResourceKind::VirtualMachine, &config).is_ok());
    }

    /// Mutating a clone never touches its source, and clone_count only grows
    #[test]
    fn clones_are_independent(
        provider in arb_provider(),
        kind in arb_kind(),
        clones in 1usize..5,
    ) {
        let family = create_family(provider, FamilyContext::for_provider(provider));
        let mut source = family.create(kind, "source", &complete_config(provider, kind)).unwrap();
        source.mark_provisioned().unwrap();
        let snapshot_attributes = source.attributes.clone();

        let mut previous = source.metadata.clone_count;
        for _ in 0..clones {
            let mut copy = source.clone_resource().unwrap();
            copy.set_attribute("marker", "changed");
            copy.set_tag("env", "scratch");

            prop_assert_ne!(&copy.id, &source.id);
            prop_assert_eq!(copy.status, ResourceStatus::Creating);
            prop_assert_eq!(copy.metadata.origin_id.as_deref(), Some(source.id.as_str()));
            prop_assert!(source.metadata.clone_count > previous);
            previous = source.metadata.clone_count;
        }

        prop_assert_eq!(source.metadata.clone_count, clones as u64);
        prop_assert_eq!(&source.attributes, &snapshot_attributes);
        prop_assert!(source.tags.is_empty());
    }
}

/// A family's resources share region, namespace and deployment id
#[test]
fn family_consistency_across_kinds() {
    let family = create_family(
        Provider::Aws,
        FamilyContext::new("eu-west-1", "vpc-0abc"),
    );

    let resources: Vec<_> = ResourceKind::ALL
        .into_iter()
        .map(|kind| {
            family
                .create(kind, "shop", &complete_config(Provider::Aws, kind))
                .unwrap()
        })
        .collect();

    for resource in &resources {
        assert_eq!(resource.region, "eu-west-1");
        assert_eq!(resource.attribute_str("vpc_id"), Some("vpc-0abc"));
        assert_eq!(
            resource.attribute_str("deployment_id"),
            Some(family.deployment_id())
        );
    }
}

/// Tier-built config through a family, provisioned, then cloned
#[test]
fn tiered_vm_clone_flow() {
    let config = build_config(
        "large",
        Some("memory"),
        Provider::Aws,
        "db-host",
        "us-east-1",
        &ResourceConfig::new().with("security_groups", json!(["sg-0a1b2c3d"])),
    )
    .unwrap();
    assert_eq!(config.get_str("instance_type"), Some("r6i.2xlarge"));
    assert_eq!(config.get_as::<u32>("memory_gb"), Some(64));

    let family = create_family(Provider::Aws, FamilyContext::new("us-east-1", "vpc-main"));
    let mut vm = family
        .create(ResourceKind::VirtualMachine, "db-host", &config)
        .unwrap();

    // Not eligible until provisioned
    assert!(vm.clone_resource().is_err());

    vm.mark_provisioned().unwrap();
    let public_ip = vm.assign_public_address().unwrap();

    let copy = vm.clone_resource().unwrap();
    assert_eq!(copy.attribute_str("public_ip"), Some("unassigned"));
    assert_ne!(copy.attribute_str("public_ip"), Some(public_ip.as_str()));
    assert_ne!(copy.attribute("private_ip"), vm.attribute("private_ip"));
    assert_eq!(copy.attribute("security_groups"), vm.attribute("security_groups"));
    assert_eq!(copy.attribute_str("instance_type"), Some("r6i.2xlarge"));
    assert_eq!(vm.metadata.clone_count, 1);
}
