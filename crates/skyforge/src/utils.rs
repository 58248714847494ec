use anyhow::{Context, bail};
use serde::Serialize;
use serde_json::Value;
use skyforge_cloud::ResourceConfig;

/// Parse one `key=value` option; the value is read as YAML so numbers,
/// booleans and lists keep their type
pub fn parse_assignment(raw: &str) -> anyhow::Result<(String, Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("expected KEY=VALUE, got '{}'", raw);
    };
    let key = key.trim();
    if key.is_empty() {
        bail!("empty key in '{}'", raw);
    }

    let value = if value.trim().is_empty() {
        Value::String(String::new())
    } else {
        serde_yaml::from_str(value).with_context(|| format!("invalid value for '{}'", key))?
    };
    Ok((key.to_string(), value))
}

pub fn parse_assignments(raw: &[String]) -> anyhow::Result<ResourceConfig> {
    raw.iter()
        .map(|assignment| parse_assignment(assignment))
        .collect()
}

/// Pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
