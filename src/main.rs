//! Dockhand CLI - expand declarative configs into docker commands

use clap::Parser;
use dockhand::cli::{Args, ContainerAction, ContainerArgs, MachineAction, MachineArgs, SubCommand};
use dockhand::config::{default_config_dir, ConfigStore, ConfigType};
use dockhand::config::ConsulMachine;
use dockhand::docker::{self, Container, Machine, MachineCreateOpts};
use dockhand::{DockhandError, ExecMode};

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(args: Args) -> dockhand::Result<()> {
    let exec = if args.debug && !args.no_debug {
        ExecMode::DryRun
    } else {
        ExecMode::Execute
    };
    let config_dir = args.config_dir.unwrap_or_else(default_config_dir);

    match args.command {
        SubCommand::Container(container_args) => {
            container_command(exec, &config_dir, container_args)
        }
        SubCommand::Machine(machine_args) => machine_command(exec, &config_dir, machine_args),
    }
}

fn container_command(
    exec: ExecMode,
    config_dir: &std::path::Path,
    args: ContainerArgs,
) -> dockhand::Result<()> {
    use ContainerAction::*;

    let store = ConfigStore::load(config_dir, Some(ConfigType::Container))?;
    let machine = Machine::new(args.machine.clone());

    match args.action {
        Kinds => {
            eprintln!("Here's a list of available kinds to create containers from:");
            for entry in store.list(ConfigType::Container) {
                println!("{}", entry);
            }
            eprintln!(
                "To create one, use the \"create\" action, supply a name, and put \
                 kind:flavor on the end."
            );
            Ok(())
        }
        Images => print_output(docker::images(exec)?),
        Ps | Processes => print_output(docker::processes(exec)?),
        Desc | Describe => {
            let key = args.name.ok_or_else(|| {
                DockhandError::UsageError(format!(
                    "Container kind:flavor required for action \"{}\". Use action \
                     \"kinds\" to list available options.",
                    args.action.as_str()
                ))
            })?;
            let (kind, flavor) = split_kind_flavor(&key);
            println!("{}", store.describe(ConfigType::Container, kind, flavor)?);
            Ok(())
        }
        Create | Run => {
            let name = require_container_name(args.name, args.action)?;
            let key = args.kind_flavor.ok_or_else(|| {
                DockhandError::UsageError(format!(
                    "No kind provided for action \"{}\".",
                    args.action.as_str()
                ))
            })?;
            let (kind, flavor) = split_kind_flavor(&key);
            let config = store.get_container(kind, flavor)?;
            let container = Container::new(name, machine);
            print_output(container.create(exec, config, args.action == Run)?)
        }
        Logs => match args.name {
            Some(name) => print_output(Container::new(name, machine).logs(exec, args.tail)?),
            None => print_output(docker::tail_all(exec)?),
        },
        Running => {
            let name = require_container_name(args.name, args.action)?;
            println!("{}", Container::new(name, machine).is_running(exec)?);
            Ok(())
        }
        Sh | Shell => {
            let name = require_container_name(args.name, args.action)?;
            print_output(Container::new(name, machine).shell(exec, &args.shell)?)
        }
        Ip => {
            let name = require_container_name(args.name, args.action)?;
            println!("{}", Container::new(name, machine).ip(exec)?);
            Ok(())
        }
        Remove | Rm => {
            let name = require_container_name(args.name, args.action)?;
            print_output(Container::new(name, machine).remove(exec, args.force)?)
        }
        Stop => {
            let name = require_container_name(args.name, args.action)?;
            print_output(Container::new(name, machine).stop(exec)?)
        }
        Kill => {
            let name = require_container_name(args.name, args.action)?;
            print_output(Container::new(name, machine).kill(exec)?)
        }
        Start => {
            let name = require_container_name(args.name, args.action)?;
            print_output(Container::new(name, machine).start(exec)?)
        }
    }
}

fn machine_command(
    exec: ExecMode,
    config_dir: &std::path::Path,
    args: MachineArgs,
) -> dockhand::Result<()> {
    use MachineAction::*;

    let store = ConfigStore::load(config_dir, Some(ConfigType::Machine))?;

    match args.action {
        Kinds => {
            eprintln!("Here's a list of available kinds to create machines from:");
            for entry in store.list(ConfigType::Machine) {
                println!("{}", entry);
            }
            eprintln!(
                "To create one, use the \"create\" action, supply a name, and put \
                 kind:flavor on the end."
            );
            Ok(())
        }
        List | Ls => print_output(Machine::list(exec)?),
        Create => {
            let name = args.name.ok_or_else(|| {
                DockhandError::UsageError("Action \"create\" requires a name.".into())
            })?;
            let mut opts = MachineCreateOpts {
                driver: args.driver,
                swarm_token: args.swarm_token,
                swarm_master: args.swarm_master,
                registry_mirror: if args.no_registry_mirror {
                    None
                } else {
                    Some(args.registry_mirror)
                },
                experimental: args.experimental,
                multihost_networking: args.multihost_networking,
                neighbor_machine: args.neighbor_machine,
                consul: match args.consul_machine {
                    Some(consul) => ConsulMachine::Named(consul),
                    None => ConsulMachine::Enabled(false),
                },
                extra_args: Vec::new(),
            };
            if let Some(key) = args.kind_flavor {
                let (kind, flavor) = split_kind_flavor(&key);
                opts.apply_config(store.get_machine(kind, flavor)?);
            }
            print_output(Machine::named(name).create(exec, &opts)?)
        }
        Ip => {
            let name = args.name.ok_or_else(|| {
                DockhandError::UsageError("Action \"ip\" requires a name.".into())
            })?;
            println!("{}", Machine::named(name).ip(exec)?);
            Ok(())
        }
        Env | Environment => {
            println!("{}", Machine::new(args.name).env(exec)?);
            Ok(())
        }
        Config => print_output(Machine::new(args.name).config(exec)?),
        Rm | Remove => print_output(Machine::new(args.name).remove(exec)?),
        Ssh => print_output(Machine::new(args.name).ssh(exec)?),
        Start => print_output(Machine::new(args.name).start(exec)?),
        Stop => print_output(Machine::new(args.name).stop(exec)?),
    }
}

fn require_container_name(
    name: Option<String>,
    action: ContainerAction,
) -> dockhand::Result<String> {
    name.ok_or_else(|| {
        DockhandError::UsageError(format!(
            "Container name required for action \"{}\".",
            action.as_str()
        ))
    })
}

/// Split a "kind:flavor" key. A missing separator leaves the flavor
/// empty, which surfaces as an unknown-flavor lookup error.
fn split_kind_flavor(key: &str) -> (&str, &str) {
    key.split_once(':').unwrap_or((key, ""))
}

fn print_output(output: String) -> dockhand::Result<()> {
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
