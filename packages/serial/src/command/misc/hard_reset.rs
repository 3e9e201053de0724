use crate::prelude::*;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

/// Resets the stick to factory defaults, wiping the network from it
#[derive(Default, Debug, Clone, PartialEq, TypedBuilder)]
pub struct HardResetRequest {
    #[builder(setter(skip), default)]
    callback_id: Option<u8>,
}

impl CommandId for HardResetRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::HardReset
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for HardResetRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for HardResetRequest {
    fn expects_response(&self) -> bool {
        false
    }

    // The confirmation is delivered to the registered one-shot handler
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
pub struct HardResetCallback {
    #[builder(default)]
    pub callback_id: Option<u8>,
}

impl CommandId for HardResetCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::HardReset
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for HardResetCallback {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}
