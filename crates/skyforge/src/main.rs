mod commands;
mod manifest;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;
use skyforge_cloud::{Provider, ResourceKind};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skyforge", version)]
#[command(about = "Provider resource families, tiered sizing and prototype cloning", long_about = None)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a virtual machine configuration from a tier and profile
    Tier {
        /// Provider (aws, azure, gcp, oracle, on-premise)
        #[arg(short, long)]
        provider: Provider,
        /// Tier (small, medium, large, xlarge)
        #[arg(short, long)]
        tier: String,
        /// Profile (general, memory, compute)
        #[arg(long)]
        profile: Option<String>,
        /// Resource name
        #[arg(short, long)]
        name: String,
        /// Region (defaults to the configured or provider default region)
        #[arg(short, long)]
        region: Option<String>,
        /// Extra option as key=value (value parsed as YAML), repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Show mandatory and optional fields for a provider
    Catalog {
        /// Provider (aws, azure, gcp, oracle, on-premise)
        #[arg(short, long)]
        provider: Provider,
        /// Resource kind (vm, database, lb, storage); all kinds when omitted
        #[arg(short, long)]
        kind: Option<ResourceKind>,
    },
    /// Create one resource through its provider family
    Create {
        /// Provider (aws, azure, gcp, oracle, on-premise)
        #[arg(short, long)]
        provider: Provider,
        /// Resource kind (vm, database, lb, storage)
        #[arg(short, long)]
        kind: ResourceKind,
        /// Resource name
        #[arg(short, long)]
        name: String,
        /// Size a virtual machine from a tier instead of explicit fields
        #[arg(short, long)]
        tier: Option<String>,
        /// Profile for --tier (general, memory, compute)
        #[arg(long, requires = "tier")]
        profile: Option<String>,
        /// Configuration field as key=value (value parsed as YAML), repeatable
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Create, register and clone everything a manifest describes
    Apply {
        /// Manifest file (YAML)
        manifest: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries JSON only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (settings, settings_path) = skyforge_config::Settings::discover()?;
    if let Some(path) = &settings_path {
        tracing::debug!("Using settings from {}", path.display());
    }

    let result = match cli.command {
        Commands::Tier {
            provider,
            tier,
            profile,
            name,
            region,
            set,
        } => commands::tier::handle(
            &settings,
            provider,
            &tier,
            profile.as_deref(),
            &name,
            region.as_deref(),
            &set,
        ),
        Commands::Catalog { provider, kind } => commands::catalog::handle(provider, kind),
        Commands::Create {
            provider,
            kind,
            name,
            tier,
            profile,
            set,
        } => commands::create::handle(
            &settings,
            provider,
            kind,
            &name,
            tier.as_deref(),
            profile.as_deref(),
            &set,
        ),
        Commands::Apply { manifest } => commands::apply::handle(&settings, &manifest),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "✗".red().bold(), e);
        std::process::exit(1);
    }
    Ok(())
}
