use crate::prelude::*;
use zwnet_cc::prelude::*;
use zwnet_core::prelude::*;

/// An unsolicited CC sent to us by a node
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationCommandRequest {
    pub command: WithAddress<CC>,
}

impl CommandId for ApplicationCommandRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::ApplicationCommandHandler
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for ApplicationCommandRequest {}
