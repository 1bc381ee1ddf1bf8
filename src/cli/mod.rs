//! Command-line interface

mod args;

pub use args::{
    Args, ContainerAction, ContainerArgs, MachineAction, MachineArgs, SubCommand,
};
