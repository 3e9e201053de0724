use derive_try_from_primitive::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The command classes the controller core knows about. Nodes may of course
/// advertise others; those are carried as `Unknown`-free raw bytes at the
/// transport boundary and never reach this enum.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    TryFromPrimitive,
    Serialize,
    Deserialize,
)]
#[repr(u8)]
pub enum CommandClasses {
    NoOperation = 0x00,
    Basic = 0x20,
    BinarySwitch = 0x25,
    MultilevelSwitch = 0x26,
    ColorSwitch = 0x33,
    ThermostatMode = 0x40,
    ThermostatSetpoint = 0x43,
    AssociationGroupInformation = 0x59,
    ZWavePlusInfo = 0x5e,
    MultiChannel = 0x60,
    DoorLock = 0x62,
    BarrierOperator = 0x66,
    WindowCovering = 0x6a,
    ManufacturerSpecific = 0x72,
    SoundSwitch = 0x79,
    WakeUp = 0x84,
    Association = 0x85,
    Version = 0x86,
    MultiChannelAssociation = 0x8e,
    Security = 0x98,
}

/// CCs that control a physical device output. Used to decide whether a group
/// that issues Basic commands may target a given endpoint.
pub const ACTUATOR_CCS: &[CommandClasses] = &[
    CommandClasses::BarrierOperator,
    CommandClasses::BinarySwitch,
    CommandClasses::ColorSwitch,
    CommandClasses::DoorLock,
    CommandClasses::MultilevelSwitch,
    CommandClasses::SoundSwitch,
    CommandClasses::ThermostatMode,
    CommandClasses::ThermostatSetpoint,
    CommandClasses::WindowCovering,
];

impl CommandClasses {
    pub fn is_actuator_cc(&self) -> bool {
        ACTUATOR_CCS.contains(self)
    }
}

impl Display for CommandClasses {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
