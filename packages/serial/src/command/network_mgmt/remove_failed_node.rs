use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum RemoveFailedNodeStatus {
    NodeOK = 0,
    NodeRemoved = 1,
    NodeNotRemoved = 2,
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct RemoveFailedNodeRequest {
    pub node_id: NodeId,
    #[builder(setter(skip), default)]
    callback_id: Option<u8>,
}

impl CommandId for RemoveFailedNodeRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RemoveFailedNode
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for RemoveFailedNodeRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for RemoveFailedNodeRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        true
    }

    fn set_callback_id(&mut self, callback_id: Option<u8>) {
        self.callback_id = callback_id;
    }
}

/// If the start flags are non-zero, the removal did not start and no
/// callback follows.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoveFailedNodeResponse {
    pub start_flags: FailedNodeStartFlags,
}

impl CommandId for RemoveFailedNodeResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RemoveFailedNode
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for RemoveFailedNodeResponse {
    fn is_ok(&self) -> bool {
        self.start_flags.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct RemoveFailedNodeCallback {
    #[builder(default)]
    pub callback_id: Option<u8>,
    pub status: RemoveFailedNodeStatus,
}

impl CommandId for RemoveFailedNodeCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RemoveFailedNode
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for RemoveFailedNodeCallback {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }

    fn is_ok(&self) -> bool {
        self.status == RemoveFailedNodeStatus::NodeRemoved
    }
}
