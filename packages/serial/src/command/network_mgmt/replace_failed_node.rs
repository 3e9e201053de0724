use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

/// Flags in the ReplaceFailedNode / RemoveFailedNode responses indicating
/// why the operation could not be started. A zero value means it started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailedNodeStartFlags(pub u8);

impl FailedNodeStartFlags {
    pub const NOT_PRIMARY_CONTROLLER: u8 = 1 << 1;
    pub const NO_CALLBACK_FUNCTION: u8 = 1 << 2;
    pub const NODE_NOT_FOUND: u8 = 1 << 3;
    pub const PROCESS_BUSY: u8 = 1 << 4;
    pub const PROCESS_FAILED: u8 = 1 << 5;

    pub fn is_ok(&self) -> bool {
        self.0 == 0
    }

    /// Expands the set flags into one human-readable reason per line
    pub fn describe(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if self.0 & Self::NOT_PRIMARY_CONTROLLER != 0 {
            reasons.push("This controller is not the primary controller");
        }
        if self.0 & Self::NO_CALLBACK_FUNCTION != 0 {
            reasons.push("The stick requires a callback to be used");
        }
        if self.0 & Self::NODE_NOT_FOUND != 0 {
            reasons.push("The node was not found in the failed nodes list");
        }
        if self.0 & Self::PROCESS_BUSY != 0 {
            reasons.push("The removal process is currently busy");
        }
        if self.0 & Self::PROCESS_FAILED != 0 {
            reasons.push("The removal process could not be started");
        }
        reasons
    }
}

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum ReplaceFailedNodeStatus {
    NodeOK = 0,
    FailedNodeReplace = 3,
    FailedNodeReplaceDone = 4,
    FailedNodeReplaceFailed = 5,
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct ReplaceFailedNodeRequest {
    pub node_id: NodeId,
    #[builder(setter(skip), default)]
    callback_id: Option<u8>,
}

impl CommandId for ReplaceFailedNodeRequest {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::ReplaceFailedNode
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Host
    }
}

impl CommandBase for ReplaceFailedNodeRequest {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }
}

impl CommandRequest for ReplaceFailedNodeRequest {
    fn expects_response(&self) -> bool {
        true
    }

    // Replace progress is reported through the registered handler
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

#[derive(Debug, Clone, PartialEq)]
pub struct ReplaceFailedNodeResponse {
    pub start_flags: FailedNodeStartFlags,
}

impl CommandId for ReplaceFailedNodeResponse {
    fn command_type(&self) -> CommandType {
        CommandType::Response
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::ReplaceFailedNode
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for ReplaceFailedNodeResponse {
    fn is_ok(&self) -> bool {
        self.start_flags.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct ReplaceFailedNodeCallback {
    #[builder(default)]
    pub callback_id: Option<u8>,
    pub status: ReplaceFailedNodeStatus,
}

impl CommandId for ReplaceFailedNodeCallback {
    fn command_type(&self) -> CommandType {
        CommandType::Request
    }

    fn function_type(&self) -> FunctionType {
        FunctionType::ReplaceFailedNode
    }

    fn origin(&self) -> MessageOrigin {
        MessageOrigin::Controller
    }
}

impl CommandBase for ReplaceFailedNodeCallback {
    fn callback_id(&self) -> Option<u8> {
        self.callback_id
    }

    fn is_ok(&self) -> bool {
        !matches!(self.status, ReplaceFailedNodeStatus::FailedNodeReplaceFailed)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_start_flags_describe_each_set_bit() {
        let flags = FailedNodeStartFlags(
            FailedNodeStartFlags::NOT_PRIMARY_CONTROLLER | FailedNodeStartFlags::NODE_NOT_FOUND,
        );
        assert!(!flags.is_ok());
        let reasons = flags.describe();
        assert_eq!(reasons.len(), 2);
        assert!(reasons[0].contains("primary controller"));
        assert!(reasons[1].contains("not found"));
    }

    #[test]
    fn test_zero_start_flags_are_ok() {
        let flags = FailedNodeStartFlags(0);
        assert!(flags.is_ok());
        assert!(flags.describe().is_empty());
    }
}
