use crate::prelude::*;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Default, Debug, Clone, PartialEq)]
pub struct GetControllerCapabilitiesRequest {}

impl CommandId for GetControllerCapabilitiesRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetControllerCapabilities
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for GetControllerCapabilitiesRequest {}

impl CommandRequest for GetControllerCapabilitiesRequest {
    fn expects_response(&self) -> bool {
        true
    }

    fn expects_callback(&self) -> bool {
        false
    }
}

#[derive(Default, Debug, Clone, PartialEq, TypedBuilder)]
#[builder(field_defaults(default))]
pub struct GetControllerCapabilitiesResponse {
    pub is_secondary: bool,
    pub is_using_home_id_from_other_network: bool,
    pub sis_present: bool,
    pub was_real_primary: bool,
    pub is_static_update_controller: bool,
}

impl CommandId for GetControllerCapabilitiesResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::GetControllerCapabilities
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for GetControllerCapabilitiesResponse {}
