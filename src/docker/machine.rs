//! Machine resolver: builds docker-machine invocations
//!
//! A [`Machine`] is a named docker-machine target, or the "local" docker
//! daemon when no name is given. Local targets turn the state-changing
//! operations into diagnostic no-ops.

use crate::command::{CommandBuilder, ExecMode, RunMode};
use crate::config::{ConsulMachine, MachineConfig};
use crate::error::{DockhandError, Result};

/// Options for `docker-machine create`, merged from CLI flags and an
/// optional `kind:flavor` config record (flags win).
#[derive(Debug, Clone, Default)]
pub struct MachineCreateOpts {
    pub driver: String,
    pub swarm_token: Option<String>,
    pub swarm_master: bool,
    pub registry_mirror: Option<String>,
    pub experimental: bool,
    pub multihost_networking: bool,
    pub neighbor_machine: Option<String>,
    pub consul: ConsulMachine,
    pub extra_args: Vec<String>,
}

impl MachineCreateOpts {
    /// Fold a config record into these options. Flags that were given
    /// explicitly keep their value.
    pub fn apply_config(&mut self, config: &MachineConfig) {
        self.experimental |= config.experimental;
        self.multihost_networking |= config.multihost_networking;
        if self.consul.machine_name().is_none() {
            self.consul = config.consul_machine.clone();
        }
        self.extra_args.extend(config.args.iter().cloned());
    }
}

/// A docker-machine target. `name == None` designates the local docker
/// daemon.
#[derive(Debug, Clone)]
pub struct Machine {
    name: Option<String>,
}

impl Machine {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn local() -> Self {
        Self { name: None }
    }

    pub fn is_local(&self) -> bool {
        self.name.is_none()
    }

    /// The machine name, with the local target rendered as loopback.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(super::resolve::LOOPBACK)
    }

    /// `docker-machine ip NAME`.
    pub fn ip(&self, exec: ExecMode) -> Result<String> {
        base_command()
            .args(["ip", self.display_name()])
            .run(exec, RunMode::Capture)
    }

    /// The machine's IP, or `None` when it cannot be determined.
    pub fn resolve_ip(&self, exec: ExecMode) -> Option<String> {
        self.ip(exec).ok().filter(|ip| !ip.is_empty())
    }

    /// `docker-machine create` with the conditional engine flags.
    pub fn create(&self, exec: ExecMode, opts: &MachineCreateOpts) -> Result<String> {
        let name = self.name.as_deref().ok_or_else(|| {
            DockhandError::UsageError("Action \"create\" requires a name.".into())
        })?;
        if opts.neighbor_machine.is_some() && !opts.multihost_networking {
            return Err(DockhandError::UsageError(
                "Neighbor machine was provided but multihost networking was not enabled \
                 explicitly. Multihost networking must be enabled if neighboring machine \
                 is to be used."
                    .into(),
            ));
        }

        let mut command = base_command();
        command.arg("create").args(["--driver", opts.driver.as_str()]);
        if let Some(token) = &opts.swarm_token {
            command.arg("--swarm");
            command.args(["--swarm-discovery".to_string(), format!("token://{}", token)]);
        }
        if opts.swarm_master {
            command.arg("--swarm-master");
        }
        if let Some(mirror) = &opts.registry_mirror {
            let ip = Machine::named(mirror).resolve_ip(exec).ok_or_else(|| {
                DockhandError::InvalidInput(
                    "IP for the registry machine could not be determined. Does that \
                     machine have an IP?"
                        .into(),
                )
            })?;
            command.args([
                "--engine-registry-mirror".to_string(),
                format!("http://{}:5000", ip),
            ]);
        }
        if opts.experimental {
            command.args(["--engine-install-url", "https://experimental.docker.com"]);
        }
        if opts.multihost_networking {
            command.args(["--engine-opt", "default-network=overlay:multihost"]);
            command.args([
                "--engine-label",
                "com.docker.network.driver.overlay.bind_interface=eth0",
            ]);
            if let Some(neighbor) = &opts.neighbor_machine {
                let ip = Machine::named(neighbor).resolve_ip(exec).ok_or_else(|| {
                    DockhandError::InvalidInput(format!(
                        "IP for neighbor machine \"{}\" could not be determined.",
                        neighbor
                    ))
                })?;
                command.args([
                    "--engine-label".to_string(),
                    format!("com.docker.network.driver.overlay.neighbor_ip={}", ip),
                ]);
            }
        }
        if let Some(consul_name) = opts.consul.machine_name() {
            let ip = Machine::named(consul_name).resolve_ip(exec).ok_or_else(|| {
                DockhandError::InvalidInput(format!(
                    "IP for consul machine \"{}\" could not be determined.",
                    consul_name
                ))
            })?;
            command.args([
                "--engine-opt".to_string(),
                format!("kv-store=consul:{}:8500", ip),
            ]);
        }
        command.args(opts.extra_args.iter().cloned());
        command.arg(name);
        command.run(exec, RunMode::Capture)
    }

    /// `docker-machine env NAME`, or `env -u` for the local target.
    pub fn env(&self, exec: ExecMode) -> Result<String> {
        let mut command = base_command();
        command.arg("env");
        match &self.name {
            Some(name) => command.arg(name.as_str()),
            None => command.arg("-u"),
        };
        command.run(exec, RunMode::Capture)
    }

    /// `docker-machine config NAME`; diagnostic no-op for local.
    pub fn config(&self, exec: ExecMode) -> Result<String> {
        match &self.name {
            None => {
                eprintln!("Machine name not provided: No config for a local Docker instance.");
                Ok(String::new())
            }
            Some(name) => base_command().args(["config", name.as_str()]).run(exec, RunMode::Capture),
        }
    }

    /// `docker-machine rm NAME`; diagnostic no-op for local.
    pub fn remove(&self, exec: ExecMode) -> Result<String> {
        match &self.name {
            None => {
                eprintln!("Machine name not provided: Cannot remove a local Docker instance.");
                Ok(String::new())
            }
            Some(name) => base_command().args(["rm", name.as_str()]).run(exec, RunMode::Capture),
        }
    }

    /// `docker-machine ssh NAME` in the foreground; diagnostic no-op for
    /// local.
    pub fn ssh(&self, exec: ExecMode) -> Result<String> {
        match &self.name {
            None => {
                eprintln!("Machine name not provided: Won't try to ssh to local.");
                Ok(String::new())
            }
            Some(name) => base_command().args(["ssh", name.as_str()]).run(exec, RunMode::Foreground),
        }
    }

    /// `docker-machine start NAME`; diagnostic no-op for local.
    pub fn start(&self, exec: ExecMode) -> Result<String> {
        match &self.name {
            None => {
                eprintln!("Machine name not provided: Won't try to start local.");
                Ok(String::new())
            }
            Some(name) => base_command().args(["start", name.as_str()]).run(exec, RunMode::Capture),
        }
    }

    /// `docker-machine stop NAME`; diagnostic no-op for local.
    pub fn stop(&self, exec: ExecMode) -> Result<String> {
        match &self.name {
            None => {
                eprintln!("Machine name not provided: Won't try to stop local.");
                Ok(String::new())
            }
            Some(name) => base_command().args(["stop", name.as_str()]).run(exec, RunMode::Capture),
        }
    }

    /// `docker-machine ls` in the foreground.
    pub fn list(exec: ExecMode) -> Result<String> {
        base_command().arg("ls").run(exec, RunMode::Foreground)
    }
}

fn base_command() -> CommandBuilder {
    CommandBuilder::new("docker-machine")
}
