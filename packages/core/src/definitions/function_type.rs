use derive_try_from_primitive::TryFromPrimitive;
use std::fmt::Display;

/// The Serial API function types used by the controller core
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TryFromPrimitive)]
#[repr(u8)]
pub enum FunctionType {
    GetSerialApiInitData = 0x02,
    ApplicationCommandHandler = 0x04,
    GetControllerCapabilities = 0x05,
    SetSerialApiTimeouts = 0x06,
    GetSerialApiCapabilities = 0x07,
    SendData = 0x13,
    GetControllerVersion = 0x15,
    GetControllerId = 0x20,
    GetNodeProtocolInfo = 0x41,
    HardReset = 0x42,
    AssignReturnRoute = 0x46,
    DeleteReturnRoute = 0x47,
    RequestNodeNeighborUpdate = 0x48,
    ApplicationUpdateRequest = 0x49,
    AddNodeToNetwork = 0x4a,
    RemoveNodeFromNetwork = 0x4b,
    AssignSucReturnRoute = 0x51,
    SetSucNodeId = 0x54,
    GetSucNodeId = 0x56,
    RemoveFailedNode = 0x61,
    IsFailedNode = 0x62,
    ReplaceFailedNode = 0x63,
    GetRoutingInfo = 0x80,
}

impl Display for FunctionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
