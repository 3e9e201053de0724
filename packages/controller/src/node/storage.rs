use crate::InterviewStage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use zwnet_cc::commandclass::{AssociationGroupProfile, EndpointDestination};
use zwnet_core::prelude::*;

/// Internal storage for a node instance. Access goes through the controller's
/// registry lock, so handles stay cheap and cloneable.
#[derive(Debug)]
pub(crate) struct NodeStorage {
    pub(crate) interview_stage: InterviewStage,
    pub(crate) status: NodeStatus,
    pub(crate) protocol_data: NodeInformationProtocolData,
    pub(crate) fingerprint: Option<DeviceFingerprint>,
    pub(crate) is_secure: bool,
    pub(crate) has_suc_return_route: bool,
    pub(crate) neighbors: Vec<NodeId>,
    pub(crate) endpoints: BTreeMap<EndpointIndex, EndpointStorage>,
    pub(crate) associations: AssociationStorage,
    pub(crate) value_index: BTreeSet<ValueId>,
}

impl NodeStorage {
    pub fn new(protocol_data: NodeInformationProtocolData) -> Self {
        let mut endpoints = BTreeMap::new();
        // Always add the root endpoint
        endpoints.insert(EndpointIndex::Root, EndpointStorage::new());

        Self {
            interview_stage: InterviewStage::None,
            status: NodeStatus::Unknown,
            protocol_data,
            fingerprint: None,
            is_secure: false,
            has_suc_return_route: false,
            neighbors: Vec::new(),
            endpoints,
            associations: AssociationStorage::default(),
            value_index: BTreeSet::new(),
        }
    }

    /// A node we know nothing about yet, e.g. one listed in the stick's init
    /// data before its cache entry has been restored
    pub fn placeholder() -> Self {
        Self::new(
            NodeInformationProtocolData::builder()
                .device_class(DeviceClass::new(0, 0, 0))
                .build(),
        )
    }

    /// Creates the storage for a node that advertised the given NIF during
    /// inclusion
    pub fn from_node_info(info: &ApplicationNodeInformation) -> Self {
        let mut storage = Self::new(
            NodeInformationProtocolData::builder()
                .device_class(info.device_class)
                .build(),
        );
        {
            let root = storage
                .endpoints
                .get_mut(&EndpointIndex::Root)
                .expect("root endpoint must exist");
            for cc in &info.supported_ccs {
                root.cc_info.insert(*cc, CommandClassInfo::supported(1));
            }
            for cc in &info.controlled_ccs {
                root.cc_info
                    .entry(*cc)
                    .or_insert_with(CommandClassInfo::default)
                    .controlled = true;
            }
        }
        storage.interview_stage = InterviewStage::NodeInfo;
        storage
    }

    pub fn root(&self) -> &EndpointStorage {
        self.endpoints
            .get(&EndpointIndex::Root)
            .expect("root endpoint must exist")
    }

    pub fn root_mut(&mut self) -> &mut EndpointStorage {
        self.endpoints
            .get_mut(&EndpointIndex::Root)
            .expect("root endpoint must exist")
    }
}

/// Internal storage for one endpoint of a node
#[derive(Debug, Default)]
pub(crate) struct EndpointStorage {
    pub(crate) cc_info: BTreeMap<CommandClasses, CommandClassInfo>,
}

impl EndpointStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

/// What we know about a node's implementation of a single CC
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandClassInfo {
    pub supported: bool,
    pub controlled: bool,
    pub secure: bool,
    pub version: u8,
}

impl CommandClassInfo {
    pub fn supported(version: u8) -> Self {
        Self {
            supported: true,
            controlled: false,
            secure: false,
            version,
        }
    }
}

/// The cached association state of a node, as last reported by it
#[derive(Debug, Default)]
pub(crate) struct AssociationStorage {
    pub(crate) group_count: Option<u8>,
    pub(crate) destinations: BTreeMap<u8, Vec<NodeId>>,
    pub(crate) max_nodes: BTreeMap<u8, u8>,

    pub(crate) mc_group_count: Option<u8>,
    pub(crate) mc_destinations: BTreeMap<u8, McDestinations>,
    pub(crate) mc_max_nodes: BTreeMap<u8, u8>,

    pub(crate) agi: AgiStorage,
}

/// The destinations of one multi-channel association group
#[derive(Debug, Default, Clone)]
pub(crate) struct McDestinations {
    pub(crate) node_ids: Vec<NodeId>,
    pub(crate) endpoints: Vec<EndpointDestination>,
}

/// Cached Association Group Information data
#[derive(Debug, Default)]
pub(crate) struct AgiStorage {
    pub(crate) names: BTreeMap<u8, String>,
    pub(crate) profiles: BTreeMap<u8, AssociationGroupProfile>,
    pub(crate) issued_commands: BTreeMap<u8, BTreeSet<CommandClasses>>,
}
