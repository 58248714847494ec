use super::{open_audit_sink, record};
use crate::utils::{parse_assignments, print_json};
use anyhow::bail;
use colored::Colorize;
use serde_json::json;
use skyforge_cloud::{AuditAction, AuditEvent, Provider, ResourceKind};
use skyforge_config::Settings;
use skyforge_providers::{build_config, create_family};

pub fn handle(
    settings: &Settings,
    provider: Provider,
    kind: ResourceKind,
    name: &str,
    tier: Option<&str>,
    profile: Option<&str>,
    set: &[String],
) -> anyhow::Result<()> {
    let context = settings.family_context(provider);
    let fields = parse_assignments(set)?;

    let config = match tier {
        Some(tier) => {
            if kind != ResourceKind::VirtualMachine {
                bail!("--tier only sizes virtual machines, not {}", kind);
            }
            build_config(tier, profile, provider, name, &context.region, &fields)?
        }
        None => fields,
    };

    let audit = open_audit_sink(settings)?;
    let family = create_family(provider, context);
    let event = AuditEvent::new(&settings.actor, AuditAction::Create, name)
        .with_provider(provider)
        .with_details(json!({ "kind": kind, "config": &config }));

    let resource = match family.create(kind, name, &config) {
        Ok(resource) => resource,
        Err(e) => {
            record(audit.as_ref(), event.failed(&e));
            return Err(e.into());
        }
    };

    record(
        audit.as_ref(),
        AuditEvent {
            resource_id: resource.id.clone(),
            ..event
        },
    );

    eprintln!(
        "{} {} {} {} ({})",
        "✓".green(),
        "Created".bold(),
        kind,
        resource.name.cyan(),
        resource.id.dimmed()
    );
    print_json(&resource)
}
