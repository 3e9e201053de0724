use crate::prelude::*;
use derive_try_from_primitive::TryFromPrimitive;
use zwnet_core::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum SecurityCCCommand {
    SchemeGet = 0x04,
    SchemeReport = 0x05,
    NetworkKeySet = 0x06,
    NetworkKeyVerify = 0x07,
    SchemeInherit = 0x08,
    NonceGet = 0x40,
    NonceReport = 0x80,
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct SecurityCCSchemeGet {}

impl CCBase for SecurityCCSchemeGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::SecurityCCSchemeReport(_))
    }
}

impl CCId for SecurityCCSchemeGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security
    }

    fn cc_command(&self) -> Option<u8> {
        Some(SecurityCCCommand::SchemeGet as _)
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct SecurityCCSchemeReport {
    /// Bitmask of schemes supported in addition to S0. Zero on conforming nodes.
    pub supported_schemes: u8,
}

impl CCBase for SecurityCCSchemeReport {}

impl CCId for SecurityCCSchemeReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security
    }

    fn cc_command(&self) -> Option<u8> {
        Some(SecurityCCCommand::SchemeReport as _)
    }
}

/// Instructs a freshly included controller to inherit the network's security
/// scheme. Answered with a Scheme Report.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct SecurityCCSchemeInherit {}

impl CCBase for SecurityCCSchemeInherit {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::SecurityCCSchemeReport(_))
    }
}

impl CCId for SecurityCCSchemeInherit {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security
    }

    fn cc_command(&self) -> Option<u8> {
        Some(SecurityCCCommand::SchemeInherit as _)
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct SecurityCCNonceGet {}

impl CCBase for SecurityCCNonceGet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::SecurityCCNonceReport(_))
    }
}

impl CCId for SecurityCCNonceGet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security
    }

    fn cc_command(&self) -> Option<u8> {
        Some(SecurityCCCommand::NonceGet as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityCCNonceReport {
    pub nonce: Vec<u8>,
}

impl CCBase for SecurityCCNonceReport {}

impl CCId for SecurityCCNonceReport {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security
    }

    fn cc_command(&self) -> Option<u8> {
        Some(SecurityCCCommand::NonceReport as _)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SecurityCCNetworkKeySet {
    pub network_key: Vec<u8>,
}

impl CCBase for SecurityCCNetworkKeySet {
    fn expects_response(&self) -> bool {
        true
    }

    fn test_response(&self, response: &CC) -> bool {
        matches!(response, CC::SecurityCCNetworkKeyVerify(_))
    }
}

impl CCId for SecurityCCNetworkKeySet {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security
    }

    fn cc_command(&self) -> Option<u8> {
        Some(SecurityCCCommand::NetworkKeySet as _)
    }
}

#[derive(Default, Debug, Clone, PartialEq)]
pub struct SecurityCCNetworkKeyVerify {}

impl CCBase for SecurityCCNetworkKeyVerify {}

impl CCId for SecurityCCNetworkKeyVerify {
    fn cc_id(&self) -> CommandClasses {
        CommandClasses::Security
    }

    fn cc_command(&self) -> Option<u8> {
        Some(SecurityCCCommand::NetworkKeyVerify as _)
    }
}
