use crate::prelude::*;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct GetRoutingInfoRequest {
    pub node_id: NodeId,
    #[builder(default)]
    pub remove_non_repeaters: bool,
    #[builder(default)]
    pub remove_bad_links: bool,
}

impl CommandId for GetRoutingInfoRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetRoutingInfo
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for GetRoutingInfoRequest {}

impl CommandRequest for GetRoutingInfoRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct GetRoutingInfoResponse {
    #[builder(default)]
    pub node_ids: Vec<NodeId>,
}

impl CommandId for GetRoutingInfoResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetRoutingInfo
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for GetRoutingInfoResponse {}
