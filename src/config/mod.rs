//! Declarative configuration: typed records plus the store that loads,
//! validates and indexes them by `type → kind → flavor`.

mod record;
mod store;

pub use record::{
    ConfigPayload, ConfigRecord, ConfigType, ConsulMachine, ContainerConfig, MachineConfig,
};
pub use store::{default_config_dir, ConfigStore};
