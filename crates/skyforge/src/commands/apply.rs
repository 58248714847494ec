use super::{open_audit_sink, record};
use crate::manifest::{Manifest, PrototypeSpec, ResourceSpec};
use crate::utils::print_json;
use colored::Colorize;
use serde_json::json;
use skyforge_cloud::{
    AuditAction, AuditEvent, AuditSink, FamilyContext, InMemoryStore, ProviderResourceFamily,
    SharedResource, read_shared,
};
use skyforge_config::Settings;
use skyforge_providers::{build_config, create_family};
use skyforge_registry::PrototypeRegistry;
use std::path::Path;

/// Everything one manifest run works against
struct Deployment<'a> {
    settings: &'a Settings,
    family: Box<dyn ProviderResourceFamily>,
    store: InMemoryStore,
    registry: PrototypeRegistry,
    audit: Box<dyn AuditSink>,
}

pub fn handle(settings: &Settings, manifest_path: &Path) -> anyhow::Result<()> {
    let manifest = Manifest::load(manifest_path)?;
    let provider = manifest.provider;

    let defaults = settings.family_context(provider);
    let context = FamilyContext::new(
        manifest.region.clone().unwrap_or(defaults.region),
        manifest.namespace.clone().unwrap_or(defaults.namespace),
    );

    let deployment = Deployment {
        settings,
        family: create_family(provider, context),
        store: InMemoryStore::new(),
        registry: PrototypeRegistry::with_clone_policy(settings.clone_policy.clone()),
        audit: open_audit_sink(settings)?,
    };

    eprintln!(
        "{} {} {} into {} ({})",
        "▶".blue(),
        "Applying".bold(),
        manifest_path.display(),
        provider.display_name().cyan(),
        deployment.family.deployment_id().dimmed()
    );

    for spec in &manifest.resources {
        let resource = deployment.create(spec)?;
        if let Some(prototype) = &spec.prototype {
            deployment.publish(&resource, spec, prototype)?;
        }
    }

    let statistics = deployment.registry.statistics();
    eprintln!();
    eprintln!(
        "{} {} resources, {} prototypes, {} clones",
        "✓".green(),
        deployment.store.len(),
        statistics.total_prototypes,
        statistics.total_clones
    );

    print_json(&json!({
        "deployment_id": deployment.family.deployment_id(),
        "resources": deployment.store.snapshot(),
        "prototypes": deployment.registry.list(None),
        "statistics": statistics,
    }))
}

impl Deployment<'_> {
    fn event(&self, action: AuditAction, resource_id: &str) -> AuditEvent {
        AuditEvent::new(&self.settings.actor, action, resource_id)
            .with_provider(self.family.provider())
    }

    /// Create, provision and run the declared lifecycle actions
    fn create(&self, spec: &ResourceSpec) -> anyhow::Result<SharedResource> {
        let provider = self.family.provider();
        let config = match &spec.tier {
            Some(tier) => build_config(
                tier,
                spec.profile.as_deref(),
                provider,
                &spec.name,
                &self.family.context().region,
                &spec.config,
            )?,
            None => spec.config.clone(),
        };

        let event = self
            .event(AuditAction::Create, &spec.name)
            .with_details(json!({ "kind": spec.kind, "config": &config }));
        let mut resource = match self.family.create(spec.kind, &spec.name, &config) {
            Ok(resource) => resource,
            Err(e) => {
                record(self.audit.as_ref(), event.failed(&e));
                return Err(e.into());
            }
        };
        record(
            self.audit.as_ref(),
            AuditEvent {
                resource_id: resource.id.clone(),
                ..event
            },
        );

        for (key, value) in &spec.tags {
            resource.set_tag(key, value);
        }
        resource.mark_provisioned()?;

        for action in &spec.actions {
            let event = self
                .event(AuditAction::Lifecycle, &resource.id)
                .with_details(json!({ "action": action }));
            if let Err(e) = resource.apply(*action) {
                record(self.audit.as_ref(), event.failed(&e));
                return Err(e.into());
            }
            record(self.audit.as_ref(), event);
        }

        eprintln!(
            "  {} {} {} {} [{}]",
            "✓".green(),
            spec.kind,
            resource.name.cyan(),
            resource.id.dimmed(),
            resource.status
        );
        Ok(self.store.insert(resource)?)
    }

    /// Register `resource` as a prototype and take the declared clones
    fn publish(
        &self,
        resource: &SharedResource,
        spec: &ResourceSpec,
        prototype: &PrototypeSpec,
    ) -> anyhow::Result<()> {
        let resource_id = read_shared(resource).id.clone();
        let category = prototype.category_for(spec.kind);
        let event = self
            .event(AuditAction::Register, &resource_id)
            .with_details(json!({ "name": &prototype.name, "category": category }));

        let prototype_id = match self.registry.register(
            resource,
            &prototype.name,
            &prototype.description,
            category,
            prototype.tags.clone(),
        ) {
            Ok(id) => id,
            Err(e) => {
                record(self.audit.as_ref(), event.failed(&e));
                return Err(e.into());
            }
        };
        record(self.audit.as_ref(), event);
        eprintln!(
            "  {} registered {} as {}",
            "◆".magenta(),
            prototype.name.cyan(),
            prototype_id.dimmed()
        );

        for clone_spec in &prototype.clones {
            let event = self
                .event(AuditAction::Clone, &resource_id)
                .with_details(json!({
                    "prototype_id": &prototype_id,
                    "name": &clone_spec.name,
                }));

            let copy = match self.registry.clone(
                &prototype_id,
                clone_spec.name.as_deref(),
                &clone_spec.tags,
            ) {
                Ok(copy) => copy,
                Err(e) => {
                    record(self.audit.as_ref(), event.failed(&e));
                    return Err(e.into());
                }
            };
            record(
                self.audit.as_ref(),
                event.with_details(json!({
                    "prototype_id": &prototype_id,
                    "clone_id": &copy.id,
                })),
            );

            eprintln!(
                "    {} cloned {} {}",
                "↳".dimmed(),
                copy.name.cyan(),
                copy.id.dimmed()
            );
            self.store.insert(copy)?;
        }

        tracing::debug!(
            "Prototype {} now has {} clones",
            prototype_id,
            read_shared(resource).metadata.clone_count
        );

        if prototype.retire {
            let event = self
                .event(AuditAction::Delete, &resource_id)
                .with_details(json!({ "prototype_id": &prototype_id }));
            if let Err(e) = self.registry.delete(&prototype_id) {
                record(self.audit.as_ref(), event.failed(&e));
                return Err(e.into());
            }
            record(self.audit.as_ref(), event);
            eprintln!(
                "  {} retired {}",
                "✗".yellow(),
                prototype.name.cyan()
            );
        }
        Ok(())
    }
}

