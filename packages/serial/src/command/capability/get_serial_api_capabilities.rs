use crate::prelude::*;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct GetSerialApiCapabilitiesRequest {}

impl CommandId for GetSerialApiCapabilitiesRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetSerialApiCapabilities
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for GetSerialApiCapabilitiesRequest {}

impl CommandRequest for GetSerialApiCapabilitiesRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct GetSerialApiCapabilitiesResponse {
    #[builder(setter(into))]
    pub serial_api_version: String,
    pub manufacturer_id: u16,
    pub product_type: u16,
    pub product_id: u16,
    #[builder(default)]
    pub supported_function_types: Vec<FunctionType>,
}

impl CommandId for GetSerialApiCapabilitiesResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetSerialApiCapabilities
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for GetSerialApiCapabilitiesResponse {}
