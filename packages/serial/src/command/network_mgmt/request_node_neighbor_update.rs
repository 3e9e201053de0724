use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum NodeNeighborUpdateStatus {
    UpdateStarted = 0x21,
    UpdateDone = 0x22,
    UpdateFailed = 0x23,
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct RequestNodeNeighborUpdateRequest {
    pub node_id: NodeId,
    #[builder(setter(skip), default)]
    callback_id: Option<u8>,
}

impl CommandId for RequestNodeNeighborUpdateRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RequestNodeNeighborUpdate
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for RequestNodeNeighborUpdateRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for RequestNodeNeighborUpdateRequest {
    fn expects_response(&self) -> bool {
        false
    }

    fn expects_callback(&self) -> bool {
        true
    }

    fn set_callback_id(&mut self, callback_id: Option<u8>) {
        self.callback_id = callback_id;
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct RequestNodeNeighborUpdateReport {
    #[builder(default)]
    pub callback_id: Option<u8>,
    pub update_status: NodeNeighborUpdateStatus,
}

impl CommandId for RequestNodeNeighborUpdateReport {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::RequestNodeNeighborUpdate
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for RequestNodeNeighborUpdateReport {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }

    fn is_ok(&self) -> bool {
        self.update_status != NodeNeighborUpdateStatus::UpdateFailed
    }
}
