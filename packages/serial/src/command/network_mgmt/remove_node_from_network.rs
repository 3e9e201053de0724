use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum RemoveNodeType {
    Any = 1,
    Controller = 2,
    Slave = 3,
    /// Leave remove mode
    Stop = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum RemoveNodeStatus {
    Ready = 1,
    NodeFound = 2,
    RemovingSlave = 3,
    RemovingController = 4,
    Done = 6,
    Failed = 7,
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct RemoveNodeFromNetworkRequest {
    #[builder(default = RemoveNodeType::Any)]
    pub node_type: RemoveNodeType,
    #[builder(default = true)]
    pub high_power: bool,
    #[builder(default = true)]
    pub network_wide: bool,
    #[builder(setter(skip), default)]
    callback_id: Option<u8>,
}

impl RemoveNodeFromNetworkRequest {
    pub fn stop() -> Self {
        Self::builder().node_type(RemoveNodeType::Stop).build()
    }
}

impl CommandId for RemoveNodeFromNetworkRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RemoveNodeFromNetwork
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for RemoveNodeFromNetworkRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for RemoveNodeFromNetworkRequest {
    fn expects_response(&self) -> bool {
        false
    }

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
pub struct RemoveNodeFromNetworkCallback {
    #[builder(default)]
    pub callback_id: Option<u8>,
    pub status: RemoveNodeStatus,
    /// Set for the RemovingSlave / RemovingController statuses
    #[builder(default, setter(strip_option))]
    pub node_id: Option<NodeId>,
}

impl CommandId for RemoveNodeFromNetworkCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RemoveNodeFromNetwork
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for RemoveNodeFromNetworkCallback {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }

    fn is_ok(&self) -> bool {
        self.status != RemoveNodeStatus::Failed
    }
}
