//! Entity resolvers for the external docker and docker-machine tools
//!
//! Each resolver turns a validated config record (or a bare target name)
//! into one external invocation through the shared
//! [`CommandBuilder`](crate::command::CommandBuilder).

mod container;
mod logs;
mod machine;
pub mod resolve;

pub use container::{images, processes, Container, DockerResolver};
pub use logs::tail_all;
pub use machine::{Machine, MachineCreateOpts};
