use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use std::fmt::Display;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum AssociationGroupInfoCCCommand {
    NameGet = 0x01,
    NameReport = 0x02,
    InfoGet = 0x03,
    InfoReport = 0x04,
    CommandListGet = 0x05,
    CommandListReport = 0x06,
}

/// The standardized semantics of an association group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationGroupProfile {
    GeneralNA,
    GeneralLifeline,
    Other(u16),
}

impl From<u16> for AssociationGroupProfile {
    fn from(raw: u16) -> Self {
        match raw {
            0x0000 => Self::GeneralNA,
            0x0001 => Self::GeneralLifeline,
            other => Self::Other(other),
        }
    }
}

impl Display for AssociationGroupProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GeneralNA => write!(f, "General: N/A"),
            Self::GeneralLifeline => write!(f, "General: Lifeline"),
            Self::Other(raw) => write!(f, "{:#06x}", raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationGroupInfoCCNameGet {
    pub group_id: u8,
}

impl CCBase for AssociationGroupInfoCCNameGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(
            response,
            CC::AssociationGroupInfoCCNameReport(report) if report.group_id == self.group_id
        )
    }
}

impl CCId for AssociationGroupInfoCCNameGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::AssociationGroupInformation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationGroupInfoCCCommand::NameGet as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationGroupInfoCCNameReport {
    pub group_id: u8,
    pub name: String,
}

impl CCBase for AssociationGroupInfoCCNameReport {}

impl CCId for AssociationGroupInfoCCNameReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::AssociationGroupInformation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationGroupInfoCCCommand::NameReport as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationGroupInfoCCInfoGet {
    pub group_id: u8,
}

impl CCBase for AssociationGroupInfoCCInfoGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(
            response,
            CC::AssociationGroupInfoCCInfoReport(report) if report.group_id == self.group_id
        )
    }
}

impl CCId for AssociationGroupInfoCCInfoGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::AssociationGroupInformation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationGroupInfoCCCommand::InfoGet as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationGroupInfoCCInfoReport {
    pub group_id: u8,
    pub profile: AssociationGroupProfile,
}

impl CCBase for AssociationGroupInfoCCInfoReport {}

impl CCId for AssociationGroupInfoCCInfoReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::AssociationGroupInformation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationGroupInfoCCCommand::InfoReport as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationGroupInfoCCCommandListGet {
    pub group_id: u8,
}

impl CCBase for AssociationGroupInfoCCCommandListGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(
            response,
            CC::AssociationGroupInfoCCCommandListReport(report) if report.group_id == self.group_id
        )
    }
}

impl CCId for AssociationGroupInfoCCCommandListGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::AssociationGroupInformation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationGroupInfoCCCommand::CommandListGet as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationGroupInfoCCCommandListReport {
    pub group_id: u8,
    pub commands: Vec<CommandClasses>,
}

impl CCBase for AssociationGroupInfoCCCommandListReport {}

impl CCId for AssociationGroupInfoCCCommandListReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::AssociationGroupInformation
    }

    fn cc_command(&self) -> Option<u8> {
        Some(AssociationGroupInfoCCCommand::CommandListReport as _)
    }
}
