use crate::prelude::*;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

/// Configures the stick's RX ACK and byte timeouts, both in units of 10 ms
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct SetSerialApiTimeoutsRequest {
    pub ack_timeout_10ms: u8,
    pub byte_timeout_10ms: u8,
}

impl CommandId for SetSerialApiTimeoutsRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::SetSerialApiTimeouts
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for SetSerialApiTimeoutsRequest {}

impl CommandRequest for SetSerialApiTimeoutsRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetSerialApiTimeoutsResponse {
    /// The timeouts that were configured before this request
    pub previous_ack_timeout_10ms: u8,
    pub previous_byte_timeout_10ms: u8,
}

impl CommandId for SetSerialApiTimeoutsResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::SetSerialApiTimeouts
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for SetSerialApiTimeoutsResponse {}
