//! The directory of stored world configurations.

use std::path::{Path, PathBuf};

use roid_world::WorldConfig;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::DevtoolsError;

/// Listing entry for one stored configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub path: PathBuf,
    pub id: String,
    pub description: Option<String>,
}

/// Only the fields the listing shows; the rest of the document is ignored.
#[derive(Deserialize)]
struct ConfigHeader {
    id: Option<String>,
    description: Option<String>,
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|e| e == "json").unwrap_or(false)
}

fn file_id(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

/// Every `*.json` configuration in `dir`, sorted by id. Unreadable files are
/// skipped with a warning; a missing directory lists nothing.
pub fn list_configs(dir: &Path) -> Vec<ConfigEntry> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Vec::new(),
    };

    let mut configs = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() || !is_json(&path) {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<ConfigHeader>(&content) {
                Ok(header) => configs.push(ConfigEntry {
                    id: header.id.unwrap_or_else(|| file_id(&path)),
                    description: header.description,
                    path,
                }),
                Err(e) => warn!("Failed to parse {}: {e}", path.display()),
            },
            Err(e) => warn!("Failed to read {}: {e}", path.display()),
        }
    }
    configs.sort_by(|a, b| a.id.cmp(&b.id));
    debug!("Found {} world configuration(s) in {}", configs.len(), dir.display());
    configs
}

/// Resolve a command-line name to a configuration file: an existing path, a
/// file stem inside `dir`, or the `id` of a stored configuration.
pub fn resolve_config(dir: &Path, name: &str) -> Result<PathBuf, DevtoolsError> {
    let direct = PathBuf::from(name);
    if direct.is_file() {
        return Ok(direct);
    }
    let stem = dir.join(format!("{name}.json"));
    if stem.is_file() {
        return Ok(stem);
    }
    list_configs(dir)
        .into_iter()
        .find(|entry| entry.id == name)
        .map(|entry| entry.path)
        .ok_or_else(|| DevtoolsError::ConfigNotFound {
            id: name.to_string(),
            dir: dir.to_path_buf(),
        })
}

pub fn load_config(path: &Path) -> Result<WorldConfig, DevtoolsError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(WorldConfig::from_json_str(&contents)?)
}

/// Validate `source` and store it in `dir` as `<id>.json`, falling back to
/// the source file name when the configuration has no id.
pub fn save_config(source: &Path, dir: &Path) -> Result<PathBuf, DevtoolsError> {
    let config = load_config(source)?;
    let name = match &config.id {
        Some(id) => format!("{id}.json"),
        None => source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string(),
    };

    std::fs::create_dir_all(dir)?;
    let target = dir.join(name);
    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(source)?)?;
    std::fs::write(&target, serde_json::to_string_pretty(&value)?)?;
    info!("Saved world configuration to {}", target.display());
    Ok(target)
}
