//! Typed configuration records
//!
//! One JSON config file describes one container or machine template. The
//! free-form field bags of the config format become typed records here:
//! every optional field is present after deserialization (at its default
//! when the file omits it) and unknown fields are rejected outright, so
//! the resolvers never branch on "is this key present".

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde_json::Value;

/// The two config record types, and the index buckets they map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigType {
    Container,
    Machine,
}

impl ConfigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigType::Container => "container",
            ConfigType::Machine => "machine",
        }
    }
}

impl fmt::Display for ConfigType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A container template. `image` is required; everything else defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerConfig {
    pub name: String,
    pub description: String,
    pub image: String,
    /// Argument templates appended after the image; may contain
    /// `{{identifier}}` placeholders.
    #[serde(default)]
    pub command: Vec<String>,
    /// BTreeMap so `--env` flags are emitted in a stable order.
    #[serde(default)]
    pub environment: BTreeMap<String, Value>,
    #[serde(default)]
    pub expose: Vec<String>,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub volumes: Vec<String>,
    #[serde(default)]
    pub volumes_from: Vec<String>,
    #[serde(default)]
    pub restart: bool,
    #[serde(default)]
    pub net: Option<String>,
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub privileged: bool,
    #[serde(default)]
    pub interactive: bool,
    #[serde(default)]
    pub tty: bool,
}

/// A machine template. No required type-specific fields.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MachineConfig {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub experimental: bool,
    #[serde(default)]
    pub consul_machine: ConsulMachine,
    #[serde(default)]
    pub multihost_networking: bool,
    /// Extra arguments passed verbatim to `docker-machine create`.
    #[serde(default)]
    pub args: Vec<String>,
}

/// The `consul_machine` field: `false` (off), `true` (use the machine
/// named "consul"), or a string naming the consul machine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ConsulMachine {
    Enabled(bool),
    Named(String),
}

impl ConsulMachine {
    /// The consul machine name to dial, or `None` when disabled.
    pub fn machine_name(&self) -> Option<&str> {
        match self {
            ConsulMachine::Enabled(false) => None,
            ConsulMachine::Enabled(true) => Some("consul"),
            ConsulMachine::Named(name) => Some(name),
        }
    }
}

impl Default for ConsulMachine {
    fn default() -> Self {
        ConsulMachine::Enabled(false)
    }
}

/// The type-specific payload of a validated record.
#[derive(Debug, Clone)]
pub enum ConfigPayload {
    Container(ContainerConfig),
    Machine(MachineConfig),
}

/// A fully validated and defaulted record. `type`, `kind` and `flavor`
/// live in the store's index, not here; the origin file name is kept for
/// diagnostics.
#[derive(Debug, Clone)]
pub struct ConfigRecord {
    pub file_name: String,
    pub payload: ConfigPayload,
}

impl ConfigRecord {
    pub fn name(&self) -> &str {
        match &self.payload {
            ConfigPayload::Container(c) => &c.name,
            ConfigPayload::Machine(m) => &m.name,
        }
    }

    pub fn description(&self) -> &str {
        match &self.payload {
            ConfigPayload::Container(c) => &c.description,
            ConfigPayload::Machine(m) => &m.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_defaults_fill_in() {
        let config: ContainerConfig = serde_json::from_value(serde_json::json!({
            "name": "Web server",
            "description": "An nginx box",
            "image": "nginx:latest"
        }))
        .unwrap();
        assert!(config.command.is_empty());
        assert!(config.environment.is_empty());
        assert!(config.ports.is_empty());
        assert!(config.links.is_empty());
        assert!(config.volumes.is_empty());
        assert!(config.volumes_from.is_empty());
        assert!(config.capabilities.is_empty());
        assert!(!config.restart);
        assert!(!config.privileged);
        assert!(!config.interactive);
        assert!(!config.tty);
        assert!(config.net.is_none());
        assert!(config.device.is_none());
        assert!(config.user.is_none());
    }

    #[test]
    fn test_container_missing_image_fails() {
        let result: Result<ContainerConfig, _> = serde_json::from_value(serde_json::json!({
            "name": "Web server",
            "description": "An nginx box"
        }));
        assert!(result.unwrap_err().to_string().contains("image"));
    }

    #[test]
    fn test_container_unknown_field_fails() {
        let result: Result<ContainerConfig, _> = serde_json::from_value(serde_json::json!({
            "name": "Web server",
            "description": "An nginx box",
            "image": "nginx:latest",
            "prots": ["80:80"]
        }));
        assert!(result.unwrap_err().to_string().contains("prots"));
    }

    #[test]
    fn test_machine_defaults_fill_in() {
        let config: MachineConfig = serde_json::from_value(serde_json::json!({
            "name": "Build machine",
            "description": "Spare laptop"
        }))
        .unwrap();
        assert!(!config.experimental);
        assert!(!config.multihost_networking);
        assert!(config.args.is_empty());
        assert_eq!(config.consul_machine, ConsulMachine::Enabled(false));
    }

    #[test]
    fn test_consul_machine_forms() {
        assert_eq!(ConsulMachine::Enabled(false).machine_name(), None);
        assert_eq!(ConsulMachine::Enabled(true).machine_name(), Some("consul"));
        assert_eq!(
            ConsulMachine::Named("kv-host".into()).machine_name(),
            Some("kv-host")
        );

        let named: ConsulMachine = serde_json::from_value(serde_json::json!("kv-host")).unwrap();
        assert_eq!(named, ConsulMachine::Named("kv-host".into()));
        let flag: ConsulMachine = serde_json::from_value(serde_json::json!(true)).unwrap();
        assert_eq!(flag, ConsulMachine::Enabled(true));
    }
}
