pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use skyforge_cloud::{ClonePolicy, FamilyContext, Provider};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment variable pointing directly at a settings file
pub const CONFIG_PATH_ENV: &str = "SKYFORGE_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["skyforge.local.yaml", "skyforge.yaml"];

/// Skyforge's directory under the user config dir (`~/.config/skyforge`)
pub fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("skyforge"))
}

/// Locate the settings file.
///
/// Lookup order:
/// 1. `SKYFORGE_CONFIG_PATH` (direct path)
/// 2. Current directory: skyforge.local.yaml, skyforge.yaml
/// 3. `./.skyforge/`, same order
/// 4. `~/.config/skyforge/skyforge.yaml` (global)
pub fn find_config_file() -> Result<PathBuf> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(&config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!("{} is set but {} does not exist", CONFIG_PATH_ENV, config_path);
    }

    let current_dir = std::env::current_dir()?;
    if let Some(path) = find_in(&current_dir) {
        return Ok(path);
    }

    if let Some(path) = find_in(&current_dir.join(".skyforge")) {
        return Ok(path);
    }

    if let Ok(dir) = config_dir() {
        let global = dir.join("skyforge.yaml");
        if global.exists() {
            return Ok(global);
        }
    }

    Err(ConfigError::SettingsFileNotFound)
}

fn find_in(dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|filename| dir.join(filename))
        .find(|path| path.exists())
}

/// Per-provider placement overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderSettings {
    pub region: Option<String>,
    pub namespace: Option<String>,
}

/// Contents of skyforge.yaml
///
/// ```yaml
/// actor: ops-team
/// audit_log: ./audit.jsonl
/// providers:
///   aws:
///     region: eu-west-1
///     namespace: vpc-0abc
/// clone_policy:
///   security_groups: regenerate
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Name recorded on audit events
    pub actor: String,

    /// JSON-lines audit file; events are kept in memory when unset
    pub audit_log: Option<PathBuf>,

    pub providers: BTreeMap<Provider, ProviderSettings>,

    pub clone_policy: ClonePolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            actor: "skyforge".to_string(),
            audit_log: None,
            providers: BTreeMap::new(),
            clone_policy: ClonePolicy::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut settings: Settings =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        // Relative audit paths are relative to the settings file
        if let (Some(audit_log), Some(parent)) = (
            settings.audit_log.as_mut().filter(|p| p.is_relative()),
            path.parent(),
        ) {
            *audit_log = parent.join(&*audit_log);
        }

        tracing::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load the discovered settings file, or built-in defaults when there is none.
    ///
    /// Returns the path that was loaded alongside the settings.
    pub fn discover() -> Result<(Self, Option<PathBuf>)> {
        match find_config_file() {
            Ok(path) => Ok((Self::load(&path)?, Some(path))),
            Err(ConfigError::SettingsFileNotFound) => {
                tracing::debug!("No settings file found, using defaults");
                Ok((Self::default(), None))
            }
            Err(e) => Err(e),
        }
    }

    pub fn region_for(&self, provider: Provider) -> String {
        self.providers
            .get(&provider)
            .and_then(|p| p.region.clone())
            .unwrap_or_else(|| provider.default_region().to_string())
    }

    /// Family placement for `provider`: configured values over provider defaults
    pub fn family_context(&self, provider: Provider) -> FamilyContext {
        let namespace = self
            .providers
            .get(&provider)
            .and_then(|p| p.namespace.clone())
            .unwrap_or_else(|| provider.default_namespace().to_string());
        FamilyContext::new(self.region_for(provider), namespace)
    }
}
