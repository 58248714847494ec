use crate::utils::print_json;
use colored::Colorize;
use skyforge_cloud::{FieldSpec, Provider, ResourceKind, ResourceKindCatalog};
use std::collections::BTreeMap;

pub fn handle(provider: Provider, kind: Option<ResourceKind>) -> anyhow::Result<()> {
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => ResourceKind::ALL.to_vec(),
    };

    for kind in &kinds {
        let spec = ResourceKindCatalog::spec_for(provider, *kind);
        eprintln!("{} {}", provider.display_name().bold(), kind.to_string().cyan());
        if spec.mandatory.is_empty() {
            eprintln!("  mandatory: {}", "(none)".dimmed());
        } else {
            eprintln!("  mandatory: {}", spec.mandatory.join(", ").yellow());
        }
        for (field, default) in &spec.optional {
            eprintln!("  {:<24} {}", field, default.to_string().dimmed());
        }
    }

    match kind {
        Some(kind) => print_json(ResourceKindCatalog::spec_for(provider, kind)),
        None => {
            let all: BTreeMap<ResourceKind, &FieldSpec> = kinds
                .into_iter()
                .map(|kind| (kind, ResourceKindCatalog::spec_for(provider, kind)))
                .collect();
            print_json(&all)
        }
    }
}
