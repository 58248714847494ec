use crate::utils::{parse_assignments, print_json};
use colored::Colorize;
use skyforge_cloud::Provider;
use skyforge_config::Settings;

pub fn handle(
    settings: &Settings,
    provider: Provider,
    tier: &str,
    profile: Option<&str>,
    name: &str,
    region: Option<&str>,
    set: &[String],
) -> anyhow::Result<()> {
    let region = region
        .map(str::to_string)
        .unwrap_or_else(|| settings.region_for(provider));
    let extra = parse_assignments(set)?;

    let config = skyforge_providers::build_config(tier, profile, provider, name, &region, &extra)?;

    eprintln!(
        "{} {} {}/{} for {} in {}",
        "✓".green(),
        provider.display_name().cyan(),
        tier,
        profile.unwrap_or("general"),
        name.bold(),
        region
    );
    print_json(&config)
}
