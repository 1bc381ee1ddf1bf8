//! Dockhand - a lazy wrapper around docker and docker-machine
//!
//! Dockhand reads declarative JSON configs describing "kinds" and
//! "flavors" of containers and machines, then expands short commands
//! into full docker / docker-machine invocations.
//!
//! # Example
//!
//! ```no_run
//! use dockhand::{ConfigStore, Container, ExecMode, Machine};
//!
//! let store = ConfigStore::load(&dockhand::default_config_dir(), None).unwrap();
//! let config = store.get_container("web", "nginx").unwrap();
//! let container = Container::new("my-web", Machine::local());
//! let output = container.create(ExecMode::DryRun, config, true).unwrap();
//! println!("{}", output);
//! ```

pub mod cli;
pub mod command;
pub mod config;
pub mod docker;
pub mod error;
pub mod term;

pub use command::{CommandBuilder, ExecMode, RunMode};
pub use config::{default_config_dir, ConfigStore, ConfigType, ContainerConfig, MachineConfig};
pub use docker::{Container, Machine, MachineCreateOpts};
pub use error::{DockhandError, Result};
