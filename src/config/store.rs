//! Config store: loads, validates and indexes JSON config records
//!
//! Every `*.json` file in the config directory holds one record. Records
//! are validated through the typed structs in [`record`](super::record),
//! then indexed by `type → kind → flavor`. The store is built once per
//! invocation and read-only afterwards.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::record::{
    ConfigPayload, ConfigRecord, ConfigType, ContainerConfig, MachineConfig,
};
use crate::error::{DockhandError, Result};

type KindMap = BTreeMap<String, BTreeMap<String, ConfigRecord>>;

/// The default config directory: a hidden folder under the user's home.
pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".dockhand")
}

/// Immutable index of validated config records.
#[derive(Debug, Default)]
pub struct ConfigStore {
    containers: KindMap,
    machines: KindMap,
}

impl ConfigStore {
    /// Load every `*.json` file in `dir`, creating the directory if it
    /// does not exist yet. When `filter` is set, records of the other
    /// type are skipped without validation.
    ///
    /// Fatal on malformed JSON, missing or unknown fields, unknown
    /// `type` values, and duplicate `(type, kind, flavor)` triples.
    pub fn load(dir: &Path, filter: Option<ConfigType>) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            DockhandError::ConfigError(format!(
                "Could not create config directory {}: {}",
                dir.display(),
                e
            ))
        })?;
        let entries = fs::read_dir(dir).map_err(|e| {
            DockhandError::ConfigError(format!(
                "Could not read config directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        // Sorted so load order (and duplicate diagnostics) is stable.
        let mut file_names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.ends_with(".json"))
            .collect();
        file_names.sort();

        let mut store = ConfigStore::default();
        for file_name in file_names {
            store.load_file(dir, &file_name, filter)?;
        }
        Ok(store)
    }

    fn load_file(&mut self, dir: &Path, file_name: &str, filter: Option<ConfigType>) -> Result<()> {
        let path = dir.join(file_name);
        let text = fs::read_to_string(&path).map_err(|e| {
            DockhandError::ConfigError(format!("Could not read config {}: {}", file_name, e))
        })?;
        let value: Value = serde_json::from_str(&text).map_err(|e| {
            DockhandError::ConfigError(format!("Config {} is not valid JSON: {}", file_name, e))
        })?;
        let mut fields = match value {
            Value::Object(map) => map,
            _ => {
                return Err(DockhandError::ConfigError(format!(
                    "Config {} is not a JSON object.",
                    file_name
                )))
            }
        };

        let type_name = take_string(&mut fields, file_name, "type")?;
        let config_type = match type_name.as_str() {
            "container" => ConfigType::Container,
            "machine" => ConfigType::Machine,
            other => {
                return Err(DockhandError::ConfigError(format!(
                    "Unknown type \"{}\". Available types are: container, machine",
                    other
                )))
            }
        };
        if filter.is_some_and(|wanted| wanted != config_type) {
            return Ok(());
        }

        // kind and flavor become index keys, not payload fields.
        let kind = take_string(&mut fields, file_name, "kind")?;
        let flavor = take_string(&mut fields, file_name, "flavor")?;

        let payload = match config_type {
            ConfigType::Container => {
                let config: ContainerConfig = serde_json::from_value(Value::Object(fields))
                    .map_err(|e| {
                        DockhandError::ConfigError(format!(
                            "Container config {}: {}",
                            file_name, e
                        ))
                    })?;
                ConfigPayload::Container(config)
            }
            ConfigType::Machine => {
                let config: MachineConfig = serde_json::from_value(Value::Object(fields))
                    .map_err(|e| {
                        DockhandError::ConfigError(format!("Machine config {}: {}", file_name, e))
                    })?;
                ConfigPayload::Machine(config)
            }
        };
        let record = ConfigRecord {
            file_name: file_name.to_string(),
            payload,
        };

        let flavors = self.bucket_mut(config_type).entry(kind).or_default();
        match flavors.entry(flavor) {
            Entry::Occupied(existing) => Err(DockhandError::ConfigError(format!(
                "Duplicate kind:flavor configs found: {} {}. Please change or remove one \
                 of these configs to have a different kind:flavor combination.",
                existing.get().file_name,
                file_name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    /// Look up the record for `(type, kind, flavor)`.
    pub fn get(&self, config_type: ConfigType, kind: &str, flavor: &str) -> Result<&ConfigRecord> {
        let flavors = self.bucket(config_type).get(kind).ok_or_else(|| {
            DockhandError::LookupError(format!("Unknown {} kind: \"{}\"", config_type, kind))
        })?;
        flavors.get(flavor).ok_or_else(|| {
            DockhandError::LookupError(format!(
                "Unknown {} flavor for {}: \"{}\"",
                config_type, kind, flavor
            ))
        })
    }

    /// Container-typed lookup.
    pub fn get_container(&self, kind: &str, flavor: &str) -> Result<&ContainerConfig> {
        match &self.get(ConfigType::Container, kind, flavor)?.payload {
            ConfigPayload::Container(config) => Ok(config),
            ConfigPayload::Machine(_) => unreachable!("container bucket holds machine record"),
        }
    }

    /// Machine-typed lookup.
    pub fn get_machine(&self, kind: &str, flavor: &str) -> Result<&MachineConfig> {
        match &self.get(ConfigType::Machine, kind, flavor)?.payload {
            ConfigPayload::Machine(config) => Ok(config),
            ConfigPayload::Container(_) => unreachable!("machine bucket holds container record"),
        }
    }

    /// All `kind:flavor` keys of one type, sorted. An absent type bucket
    /// yields an empty list, not an error.
    pub fn list(&self, config_type: ConfigType) -> Vec<String> {
        self.bucket(config_type)
            .iter()
            .flat_map(|(kind, flavors)| {
                flavors
                    .keys()
                    .map(move |flavor| format!("{}:{}", kind, flavor))
            })
            .collect()
    }

    /// `"name":\tdescription` for one record.
    pub fn describe(&self, config_type: ConfigType, kind: &str, flavor: &str) -> Result<String> {
        let record = self.get(config_type, kind, flavor)?;
        Ok(format!("\"{}\":\t{}", record.name(), record.description()))
    }

    fn bucket(&self, config_type: ConfigType) -> &KindMap {
        match config_type {
            ConfigType::Container => &self.containers,
            ConfigType::Machine => &self.machines,
        }
    }

    fn bucket_mut(&mut self, config_type: ConfigType) -> &mut KindMap {
        match config_type {
            ConfigType::Container => &mut self.containers,
            ConfigType::Machine => &mut self.machines,
        }
    }
}

fn take_string(
    fields: &mut serde_json::Map<String, Value>,
    file_name: &str,
    key: &str,
) -> Result<String> {
    match fields.remove(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(DockhandError::ConfigError(format!(
            "Config {}: field \"{}\" must be a string.",
            file_name, key
        ))),
        None => Err(DockhandError::ConfigError(format!(
            "Config {} is missing its {}.",
            file_name, key
        ))),
    }
}
