//! CLI argument parsing

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "dockhand")]
#[command(author, version, about = "A lazy wrapper around docker and docker-machine", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: SubCommand,

    /// The config directory holding kind:flavor records (default:
    /// ~/.dockhand, created if absent)
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Print out the commands instead of executing them
    #[arg(long, global = true, env = "DOCKHAND_DEBUG")]
    pub debug: bool,

    /// Disable debug mode
    #[arg(long, global = true, overrides_with = "debug")]
    pub no_debug: bool,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Manage containers defined by kind:flavor configs
    Container(ContainerArgs),

    /// Manage docker machines
    Machine(MachineArgs),
}

#[derive(clap::Args)]
pub struct ContainerArgs {
    /// The action to perform
    #[arg(value_enum)]
    pub action: ContainerAction,

    /// The name of the container to be used
    pub name: Option<String>,

    /// Of form "kind:flavor"; use the "kinds" action to list options
    #[arg(value_name = "KIND:FLAVOR")]
    pub kind_flavor: Option<String>,

    /// The machine in which this container is located
    #[arg(short, long, env = "DOCKER_MACHINE_NAME")]
    pub machine: Option<String>,

    /// Force the current command, if supported
    #[arg(short, long)]
    pub force: bool,

    /// Number of trailing log lines to start from
    #[arg(long, default_value_t = 100)]
    pub tail: u32,

    /// Shell to start inside the container
    #[arg(long, default_value = "sh")]
    pub shell: String,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContainerAction {
    Create,
    Run,
    Desc,
    Describe,
    Sh,
    Shell,
    Images,
    Ip,
    Kill,
    Kinds,
    Logs,
    Ps,
    Processes,
    Remove,
    Rm,
    Running,
    Stop,
    Start,
}

impl ContainerAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerAction::Create => "create",
            ContainerAction::Run => "run",
            ContainerAction::Desc => "desc",
            ContainerAction::Describe => "describe",
            ContainerAction::Sh => "sh",
            ContainerAction::Shell => "shell",
            ContainerAction::Images => "images",
            ContainerAction::Ip => "ip",
            ContainerAction::Kill => "kill",
            ContainerAction::Kinds => "kinds",
            ContainerAction::Logs => "logs",
            ContainerAction::Ps => "ps",
            ContainerAction::Processes => "processes",
            ContainerAction::Remove => "remove",
            ContainerAction::Rm => "rm",
            ContainerAction::Running => "running",
            ContainerAction::Stop => "stop",
            ContainerAction::Start => "start",
        }
    }
}

#[derive(clap::Args)]
pub struct MachineArgs {
    /// The action to perform
    #[arg(value_enum)]
    pub action: MachineAction,

    /// The name of the machine to use
    pub name: Option<String>,

    /// Of form "kind:flavor"; merged into machine creation options
    #[arg(value_name = "KIND:FLAVOR")]
    pub kind_flavor: Option<String>,

    /// The driver used to provision a machine
    #[arg(short, long, default_value = "kvm")]
    pub driver: String,

    /// The machine on which a consul server is running
    #[arg(short = 'c', long)]
    pub consul_machine: Option<String>,

    /// Use the experimental docker engine
    #[arg(short, long)]
    pub experimental: bool,

    /// Enable experimental multihost networking
    #[arg(short = 'm', long)]
    pub multihost_networking: bool,

    /// A neighboring machine for multihost networking
    #[arg(short = 'n', long)]
    pub neighbor_machine: Option<String>,

    /// The registry mirror used to cache Docker Hub requests
    #[arg(short = 'r', long, default_value = "pi-registry")]
    pub registry_mirror: String,

    /// Disable the registry mirror
    #[arg(short = 'R', long)]
    pub no_registry_mirror: bool,

    /// The swarm token for this machine
    #[arg(short = 's', long)]
    pub swarm_token: Option<String>,

    /// Make this machine a swarm master
    #[arg(long)]
    pub swarm_master: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MachineAction {
    Config,
    Create,
    Env,
    Environment,
    Ip,
    Kinds,
    List,
    Ls,
    Rm,
    Remove,
    Ssh,
    Start,
    Stop,
}

impl MachineAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineAction::Config => "config",
            MachineAction::Create => "create",
            MachineAction::Env => "env",
            MachineAction::Environment => "environment",
            MachineAction::Ip => "ip",
            MachineAction::Kinds => "kinds",
            MachineAction::List => "list",
            MachineAction::Ls => "ls",
            MachineAction::Rm => "rm",
            MachineAction::Remove => "remove",
            MachineAction::Ssh => "ssh",
            MachineAction::Start => "start",
            MachineAction::Stop => "stop",
        }
    }
}
