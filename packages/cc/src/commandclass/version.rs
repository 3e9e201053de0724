use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum VersionCCCommand {
    CommandClassGet = 0x13,
    CommandClassReport = 0x14,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionCCCommandClassGet {
    pub requested_cc: CommandClasses,
}

impl CCBase for VersionCCCommandClassGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(
            response,
            CC::VersionCCCommandClassReport(report) if report.requested_cc == self.requested_cc
        )
    }
}

impl CCId for VersionCCCommandClassGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Version
    }

    fn cc_command(&self) -> Option<u8> {
        Some(VersionCCCommand::CommandClassGet as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VersionCCCommandClassReport {
    pub requested_cc: CommandClasses,
    pub version: u8,
}

impl CCBase for VersionCCCommandClassReport {}

impl CCId for VersionCCCommandClassReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Version
    }

    fn cc_command(&self) -> Option<u8> {
        Some(VersionCCCommand::CommandClassReport as _)
    }
}
