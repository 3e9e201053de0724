use derive_try_from_primitive::TryFromPrimitive;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub enum ZWaveLibraryType {
    Unknown,
    StaticController,
    Controller,
    EnhancedSlave,
    Slave,
    Installer,
    RoutingSlave,
    BridgeController,
    DeviceUnderTest,
    NotApplicable,
    AvRemote,
    AvDevice,
}

impl Display for ZWaveLibraryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Unknown => "Unknown",
            Self::StaticController => "Static Controller",
            Self::Controller => "Controller",
            Self::EnhancedSlave => "Enhanced Slave",
            Self::Slave => "Slave",
            Self::Installer => "Installer",
            Self::RoutingSlave => "Routing Slave",
            Self::BridgeController => "Bridge Controller",
            Self::DeviceUnderTest => "Device under Test",
            Self::NotApplicable => "N/A",
            Self::AvRemote => "AV Remote",
            Self::AvDevice => "AV Device",
        };
        write!(f, "{}", name)
    }
}
