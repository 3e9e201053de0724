use std::collections::BTreeMap;
use std::time::Duration;
use typed_builder::TypedBuilder;
use zwnet_core::definitions::DeviceFingerprint;

/// Serial communication timeouts, pushed to the stick during the interview
#[derive(Debug, Clone, Copy, PartialEq, Eq, TypedBuilder)]
pub struct Timeouts {
    #[builder(default = Duration::from_millis(1000))]
    pub ack: Duration,
    #[builder(default = Duration::from_millis(150))]
    pub byte: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[derive(Default, TypedBuilder)]
pub struct ControllerOptions {
    #[builder(default)]
    pub timeouts: Timeouts,
    /// The S0 network key. Secure inclusion is disabled without it.
    #[builder(default, setter(into))]
    pub network_key: Option<Vec<u8>>,
    #[builder(default)]
    pub config: ConfigManager,
}

/// Compiled device configuration, looked up by fingerprint. The full
/// configuration files cover much more; the controller core only consumes
/// the association metadata.
#[derive(Default)]
pub struct ConfigManager {
    devices: BTreeMap<DeviceFingerprint, DeviceConfig>,
}

impl ConfigManager {
    pub fn add_device(&mut self, fingerprint: DeviceFingerprint, config: DeviceConfig) {
        self.devices.insert(fingerprint, config);
    }

    pub fn lookup_device(&self, fingerprint: &DeviceFingerprint) -> Option<&DeviceConfig> {
        self.devices.get(fingerprint)
    }
}

#[derive(Debug, Default, Clone)]
pub struct DeviceConfig {
    /// Association group metadata, keyed by 1-based group id
    pub associations: BTreeMap<u8, AssociationConfig>,
}

impl DeviceConfig {
    pub fn association(&self, group_id: u8) -> Option<&AssociationConfig> {
        self.associations.get(&group_id)
    }
}

#[derive(Debug, Clone, TypedBuilder)]
pub struct AssociationConfig {
    #[builder(setter(into))]
    pub label: String,
    #[builder(default = 1)]
    pub max_nodes: u8,
    #[builder(default)]
    pub is_lifeline: bool,
    /// `false` pins this group to plain associations even when the node
    /// supports the multi-channel variant
    #[builder(default = true)]
    pub multi_channel: bool,
}
