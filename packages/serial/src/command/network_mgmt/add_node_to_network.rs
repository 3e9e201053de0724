use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum AddNodeType {
    Any = 1,
    Controller = 2,
    Slave = 3,
    Existing = 4,
    /// Leave add mode
    Stop = 5,
    /// Stop sending callbacks for the previous add
    StopControllerReplication = 6,
}

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum AddNodeStatus {
    Ready = 1,
    NodeFound = 2,
    AddingSlave = 3,
    AddingController = 4,
    ProtocolDone = 5,
    Done = 6,
    Failed = 7,
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct AddNodeToNetworkRequest {
    #[builder(default = AddNodeType::Any)]
    pub node_type: AddNodeType,
    #[builder(default = true)]
    pub high_power: bool,
    #[builder(default = true)]
    pub network_wide: bool,
    #[builder(setter(skip), default)]
    callback_id: Option<u8>,
}

impl AddNodeToNetworkRequest {
    pub fn stop() -> Self {
        Self::builder().node_type(AddNodeType::Stop).build()
    }
}

impl CommandId for AddNodeToNetworkRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::AddNodeToNetwork
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for AddNodeToNetworkRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for AddNodeToNetworkRequest {
    fn expects_response(&self) -> bool {
        false
    }

    // The status reports are delivered to the registered handler instead
    fn expects_callback(&self) -> bool {
        false
    }

    fn needs_callback_id(&self) -> bool {
        true
    }

    fn set_callback_id(&mut self, callback_id: Option<u8>) {
        self.callback_id = callback_id;
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct AddNodeToNetworkCallback {
    #[builder(default)]
    pub callback_id: Option<u8>,
    pub status: AddNodeStatus,
    /// Set for the AddingSlave / AddingController / Done statuses
    #[builder(default, setter(strip_option))]
    pub status_context: Option<AddNodeStatusContext>,
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct AddNodeStatusContext {
    pub node_id: NodeId,
    /// The NIF the joining node advertised, if any
    #[builder(default, setter(strip_option))]
    pub node_info: Option<ApplicationNodeInformation>,
}

impl CommandId for AddNodeToNetworkCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::AddNodeToNetwork
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for AddNodeToNetworkCallback {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }

    fn is_ok(&self) -> bool {
        self.status != AddNodeStatus::Failed
    }
}
