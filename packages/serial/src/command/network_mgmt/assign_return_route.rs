use crate::prelude::*;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct AssignReturnRouteRequest {
    pub node_id: NodeId,
    pub destination_node_id: NodeId,
    #[builder(setter(skip), default)]
    callback_id: Option<u8>,
}

impl CommandId for AssignReturnRouteRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::AssignReturnRoute
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for AssignReturnRouteRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for AssignReturnRouteRequest {
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

#[derive(Debug, Clone, PartialEq)]
pub struct AssignReturnRouteResponse {
    pub was_executed: bool,
}

impl CommandId for AssignReturnRouteResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::AssignReturnRoute
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for AssignReturnRouteResponse {
    fn is_ok(&self) -> bool {
        self.was_executed
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct AssignReturnRouteCallback {
    #[builder(default)]
    pub callback_id: Option<u8>,
    pub success: bool,
}

impl CommandId for AssignReturnRouteCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::AssignReturnRoute
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for AssignReturnRouteCallback {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }

    fn is_ok(&self) -> bool {
        self.success
    }
}
