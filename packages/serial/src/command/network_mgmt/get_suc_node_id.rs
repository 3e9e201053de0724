use crate::prelude::*;
use zwnet_core::prelude::*;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct GetSucNodeIdRequest {}

impl CommandId for GetSucNodeIdRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetSucNodeId
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for GetSucNodeIdRequest {}

impl CommandRequest for GetSucNodeIdRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetSucNodeIdResponse {
    /// `None` when the network has no SUC
    pub suc_node_id: Option<NodeId>,
}

impl CommandId for GetSucNodeIdResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetSucNodeId
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for GetSucNodeIdResponse {}
