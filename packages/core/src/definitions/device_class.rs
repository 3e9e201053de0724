use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// The basic/generic/specific device class triple advertised in a NIF
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceClass {
    pub basic: u8,
    pub generic: u8,
    pub specific: u8,
}

impl DeviceClass {
    pub fn new(basic: u8, generic: u8, specific: u8) -> Self {
        Self {
            basic,
            generic,
            specific,
        }
    }
}

impl Display for DeviceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#04x} / {:#04x} / {:#04x}",
            self.basic, self.generic, self.specific
        )
    }
}

/// The identity of a device as reported by the Serial API
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeviceFingerprint {
    pub manufacturer_id: u16,
    pub product_type: u16,
    pub product_id: u16,
}

impl DeviceFingerprint {
    pub fn new(manufacturer_id: u16, product_type: u16, product_id: u16) -> Self {
        Self {
            manufacturer_id,
            product_type,
            product_id,
        }
    }
}

impl Display for DeviceFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#06x}:{:#06x}:{:#06x}",
            self.manufacturer_id, self.product_type, self.product_id
        )
    }
}
