use enum_dispatch::enum_dispatch;
use zwnet_core::prelude::*;

pub mod capability;
pub mod misc;
pub mod network_mgmt;
pub mod transport;

pub use capability::*;
pub use misc::*;
pub use network_mgmt::*;
pub use transport::*;

#[enum_dispatch(Command)]
/// Identifies a Serial API command
pub trait CommandId {
    fn command_type(&self) -> CommandType;

    fn function_type(&self) -> FunctionType;

    fn origin(&self) -> MessageOrigin;
}

#[enum_dispatch(Command)]
/// Command-specific functionality that may need to be implemented for each command
pub trait CommandBase: std::fmt::Debug + Sync + Send + Clone + PartialEq {
    fn callback_id(&self) -> Option<u8> {
        None
    }

    /// Whether the command contains a success indication. Commands without
    /// one default to `true`.
    fn is_ok(&self) -> bool {
        true
    }
}

/// Command-specific functionality for outgoing requests
pub trait CommandRequest: CommandId + CommandBase {
    /// Whether the stick answers this request with an immediate response
    fn expects_response(&self) -> bool;

    /// Whether the stick sends a deferred callback for this request
    fn expects_callback(&self) -> bool;

    fn needs_callback_id(&self) -> bool {
        self.expects_callback()
    }

    fn set_callback_id(&mut self, callback_id: Option<u8>) {
        let _ = callback_id;
    }
}

#[enum_dispatch]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetControllerVersionRequest(GetControllerVersionRequest),
    GetControllerVersionResponse(GetControllerVersionResponse),
    GetControllerIdRequest(GetControllerIdRequest),
    GetControllerIdResponse(GetControllerIdResponse),
    GetControllerCapabilitiesRequest(GetControllerCapabilitiesRequest),
    GetControllerCapabilitiesResponse(GetControllerCapabilitiesResponse),
    GetSerialApiCapabilitiesRequest(GetSerialApiCapabilitiesRequest),
    GetSerialApiCapabilitiesResponse(GetSerialApiCapabilitiesResponse),
    GetSerialApiInitDataRequest(GetSerialApiInitDataRequest),
    GetSerialApiInitDataResponse(GetSerialApiInitDataResponse),
    SetSerialApiTimeoutsRequest(SetSerialApiTimeoutsRequest),
    SetSerialApiTimeoutsResponse(SetSerialApiTimeoutsResponse),
    GetNodeProtocolInfoRequest(GetNodeProtocolInfoRequest),
    GetNodeProtocolInfoResponse(GetNodeProtocolInfoResponse),
    GetSucNodeIdRequest(GetSucNodeIdRequest),
    GetSucNodeIdResponse(GetSucNodeIdResponse),
    SetSucNodeIdRequest(SetSucNodeIdRequest),
    SetSucNodeIdResponse(SetSucNodeIdResponse),
    SetSucNodeIdCallback(SetSucNodeIdCallback),
    AddNodeToNetworkRequest(AddNodeToNetworkRequest),
    AddNodeToNetworkCallback(AddNodeToNetworkCallback),
    RemoveNodeFromNetworkRequest(RemoveNodeFromNetworkRequest),
    RemoveNodeFromNetworkCallback(RemoveNodeFromNetworkCallback),
    ReplaceFailedNodeRequest(ReplaceFailedNodeRequest),
    ReplaceFailedNodeResponse(ReplaceFailedNodeResponse),
    ReplaceFailedNodeCallback(ReplaceFailedNodeCallback),
    RemoveFailedNodeRequest(RemoveFailedNodeRequest),
    RemoveFailedNodeResponse(RemoveFailedNodeResponse),
    RemoveFailedNodeCallback(RemoveFailedNodeCallback),
    RequestNodeNeighborUpdateRequest(RequestNodeNeighborUpdateRequest),
    RequestNodeNeighborUpdateReport(RequestNodeNeighborUpdateReport),
    GetRoutingInfoRequest(GetRoutingInfoRequest),
    GetRoutingInfoResponse(GetRoutingInfoResponse),
    DeleteReturnRouteRequest(DeleteReturnRouteRequest),
    DeleteReturnRouteResponse(DeleteReturnRouteResponse),
    DeleteReturnRouteCallback(DeleteReturnRouteCallback),
    AssignReturnRouteRequest(AssignReturnRouteRequest),
    AssignReturnRouteResponse(AssignReturnRouteResponse),
    AssignReturnRouteCallback(AssignReturnRouteCallback),
    AssignSucReturnRouteRequest(AssignSucReturnRouteRequest),
    AssignSucReturnRouteResponse(AssignSucReturnRouteResponse),
    AssignSucReturnRouteCallback(AssignSucReturnRouteCallback),
    HardResetRequest(HardResetRequest),
    HardResetCallback(HardResetCallback),
    SendDataRequest(SendDataRequest),
    SendDataResponse(SendDataResponse),
    SendDataCallback(SendDataCallback),
    ApplicationCommandRequest(ApplicationCommandRequest),
}
