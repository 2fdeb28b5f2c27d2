use crate::error::{Result, ScoutError};
use crate::types::config::{ScoringModel, ScoutConfig, DEFAULT_CONFIG};
use std::path::{Path, PathBuf};
use toml::Value;

pub const DEFAULT_CONFIG_FILE: &str = "scout.toml";
pub const DEFAULT_LOCAL_FILE: &str = ".scout/local.toml";
pub const DEFAULT_GLOBAL_CONFIG_FILE: &str = ".config/scout/config.toml";

/// Loads and validates the scoring model for a run.
///
/// Layers, later wins: built-in defaults, `~/.config/scout/config.toml`,
/// `<root>/scout.toml`, `<root>/.scout/local.toml`. An explicit path replaces
/// the file discovery but is still merged over the defaults.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<ScoringModel> {
    let global = std::env::var_os("HOME")
        .map(PathBuf::from)
        .map(|home| home.join(DEFAULT_GLOBAL_CONFIG_FILE));
    load_config_with_global(root, explicit, global.as_deref())
}

pub(crate) fn load_config_with_global(
    root: &Path,
    explicit: Option<&Path>,
    global_path: Option<&Path>,
) -> Result<ScoringModel> {
    let mut merged = default_value()?;

    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(ScoutError::PathNotFound(path.display().to_string()));
            }
            merge_file_if_exists(&mut merged, path)?;
        }
        None => {
            if let Some(path) = global_path {
                merge_file_if_exists(&mut merged, path)?;
            }
            merge_file_if_exists(&mut merged, &root.join(DEFAULT_CONFIG_FILE))?;
            merge_file_if_exists(&mut merged, &root.join(DEFAULT_LOCAL_FILE))?;
        }
    }

    let cfg: ScoutConfig = merged
        .try_into()
        .map_err(|e: toml::de::Error| ScoutError::ConfigParse(e.to_string()))?;
    let model = cfg.validate()?;
    tracing::info!(
        dimensions = model.dimensions.len(),
        lenses = model.lenses.len(),
        "scoring configuration loaded"
    );
    Ok(model)
}

/// Parses a config document layered over the defaults.
#[cfg(test)]
pub fn parse_config(content: &str) -> Result<ScoutConfig> {
    let mut merged = default_value()?;
    let overlay: Value =
        toml::from_str(content).map_err(|e| ScoutError::ConfigParse(e.to_string()))?;
    merge_toml(&mut merged, overlay, "");
    merged
        .try_into()
        .map_err(|e: toml::de::Error| ScoutError::ConfigParse(e.to_string()))
}

fn default_value() -> Result<Value> {
    toml::from_str(DEFAULT_CONFIG).map_err(|e| ScoutError::ConfigParse(e.to_string()))
}

fn merge_file_if_exists(merged: &mut Value, path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let value = read_toml_value(path)?;
    tracing::debug!(path = %path.display(), "merging config layer");
    merge_toml(merged, value, "");
    Ok(())
}

fn read_toml_value(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| ScoutError::ConfigParse(format!("{}: {}", path.display(), e)))
}

/// Weight vectors and gate threshold tables are replaced whole, never blended key by key.
fn replaces_wholesale(path: &str) -> bool {
    path.ends_with(".components") || path.ends_with(".weights") || path.starts_with("gates.")
}

fn merge_toml(base: &mut Value, overlay: Value, path: &str) {
    match (base, overlay) {
        (Value::Table(base_table), Value::Table(overlay_table)) if !replaces_wholesale(path) => {
            for (key, value) in overlay_table {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                match base_table.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value, &child),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => {
            *slot = value;
        }
    }
}
