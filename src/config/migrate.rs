//! Config file upgrades: files written by older versions lack the newer keys.

use super::{CONFIG_KEYS, Config};
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
    let yaml: Value = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;

    match yaml {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{}: top level is not a mapping",
            path.display()
        ))),
    }
}

/// Keys of [`CONFIG_KEYS`] absent from the file at `path`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<&'static str>> {
    let map = read_mapping(path)?;
    Ok(CONFIG_KEYS
        .iter()
        .copied()
        .filter(|k| !map.contains_key(Value::String(k.to_string())))
        .collect())
}

/// Add every missing key with its default value, keeping existing values.
/// Returns the keys that were added.
pub fn migrate_config_file(path: &Path) -> AppResult<Vec<&'static str>> {
    let mut map = read_mapping(path)?;
    let defaults = match serde_yaml::to_value(Config::default()) {
        Ok(Value::Mapping(m)) => m,
        _ => return Err(AppError::ConfigSave),
    };

    let mut added = Vec::new();
    for key in CONFIG_KEYS {
        let k = Value::String(key.to_string());
        if !map.contains_key(&k)
            && let Some(v) = defaults.get(&k)
        {
            map.insert(k, v.clone());
            added.push(*key);
        }
    }

    if added.is_empty() {
        info(format!("{} is up to date.", path.display()));
        return Ok(added);
    }

    let serialized = serde_yaml::to_string(&Value::Mapping(map)).map_err(|_| AppError::ConfigSave)?;
    fs::write(path, serialized).map_err(|_| AppError::ConfigSave)?;
    success(format!(
        "Config migrated: added {} to {}",
        added.join(", "),
        path.display()
    ));
    Ok(added)
}
