use crate::definitions::{CommandClasses, DeviceClass};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// The protocol-level information the stick keeps about a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct NodeInformationProtocolData {
    pub device_class: DeviceClass,
    #[builder(default = true)]
    pub listening: bool,
    #[builder(default)]
    pub frequent_listening: bool,
    #[builder(default = true)]
    pub routing: bool,
}

/// The application-level information a node advertises in its NIF,
/// e.g. while it is being added to the network
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct ApplicationNodeInformation {
    pub device_class: DeviceClass,
    #[builder(default)]
    pub supported_ccs: Vec<CommandClasses>,
    #[builder(default)]
    pub controlled_ccs: Vec<CommandClasses>,
}
