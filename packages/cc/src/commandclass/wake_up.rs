use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum WakeUpCCCommand {
    IntervalSet = 0x04,
    IntervalGet = 0x05,
    IntervalReport = 0x06,
    WakeUpNotification = 0x07,
    NoMoreInformation = 0x08,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct WakeUpCCIntervalGet {}

impl CCBase for WakeUpCCIntervalGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::WakeUpCCIntervalReport(_))
    }
}

impl CCId for WakeUpCCIntervalGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::WakeUp
    }

    fn cc_command(&self) -> Option<u8> {
        Some(WakeUpCCCommand::IntervalGet as _)
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct WakeUpCCIntervalReport {
    pub interval_seconds: u32,
    /// The node the sleeping device reports its wake-ups to
    pub controller_node_id: NodeId,
}

impl CCBase for WakeUpCCIntervalReport {}

impl CCId for WakeUpCCIntervalReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::WakeUp
    }

    fn cc_command(&self) -> Option<u8> {
        Some(WakeUpCCCommand::IntervalReport as _)
    }
}

#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct WakeUpCCIntervalSet {
    pub interval_seconds: u32,
    pub controller_node_id: NodeId,
}

impl CCBase for WakeUpCCIntervalSet {}

impl CCId for WakeUpCCIntervalSet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::WakeUp
    }

    fn cc_command(&self) -> Option<u8> {
        Some(WakeUpCCCommand::IntervalSet as _)
    }
}
