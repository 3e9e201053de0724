pub mod error;

mod controller;
pub use crate::controller::*;

mod node;
pub use crate::node::*;

mod config;
pub use crate::config::*;

mod events;
pub use crate::events::*;

mod serial_api;
pub use crate::serial_api::*;

mod exec_node_command;
pub use crate::exec_node_command::*;

pub(crate) mod awaited;

#[cfg(test)]
pub(crate) mod test_utils;
