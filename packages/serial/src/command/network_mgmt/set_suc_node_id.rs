use crate::prelude::*;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct SetSucNodeIdRequest {
    // Needed for knowing whether a callback is expected
    pub own_node_id: NodeId,
    pub suc_node_id: NodeId,
    pub enable_suc: bool,
    pub enable_sis: bool,
    #[builder(setter(skip), default)]
    callback_id: Option<u8>,
}

impl CommandId for SetSucNodeIdRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::SetSucNodeId
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for SetSucNodeIdRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for SetSucNodeIdRequest {
    fn expects_response(&self) -> bool {
        true
    }

    // Assigning the SUC role to ourselves is confirmed by the response alone
    fn expects_callback(&self) -> bool {
        self.suc_node_id != self.own_node_id
    }

    fn needs_callback_id(&self) -> bool {
        true
    }

    fn set_callback_id(&mut self, callback_id: Option<u8>) {
        self.callback_id = callback_id;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetSucNodeIdResponse {
    pub was_executed: bool,
}

impl CommandId for SetSucNodeIdResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::SetSucNodeId
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for SetSucNodeIdResponse {
    fn is_ok(&self) -> bool {
        self.was_executed
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct SetSucNodeIdCallback {
    #[builder(default)]
    pub callback_id: Option<u8>,
    pub success: bool,
}

impl CommandId for SetSucNodeIdCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::SetSucNodeId
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for SetSucNodeIdCallback {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }

    fn is_ok(&self) -> bool {
        self.success
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_self_promotion_needs_no_callback() {
        let cmd = SetSucNodeIdRequest::builder()
            .own_node_id(NodeId::new(1))
            .suc_node_id(NodeId::new(1))
            .enable_suc(true)
            .enable_sis(true)
            .build();
        assert!(cmd.expects_response());
        assert!(!cmd.expects_callback());

        let cmd = SetSucNodeIdRequest::builder()
            .own_node_id(NodeId::new(1))
            .suc_node_id(NodeId::new(4))
            .enable_suc(true)
            .enable_sis(false)
            .build();
        assert!(cmd.expects_callback());
    }
}
