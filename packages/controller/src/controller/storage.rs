use crate::HealNodeStatus;
use crate::error::Result;
use futures::channel::oneshot;
use std::collections::{BTreeMap, HashSet};
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;

/// Identity and runtime state of the controller itself. Everything the
/// interview determines plus the flags the long-running operations use for
/// their cooperative locking.
#[derive(TypedBuilder)]
pub(crate) struct ControllerStorage {
    pub home_id: u32,
    pub own_node_id: NodeId,
    pub suc_node_id: Option<NodeId>,
    #[builder(setter(into))]
    pub library_version: String,
    pub library_type: ZWaveLibraryType,
    #[builder(setter(into))]
    pub serial_api_version: String,
    pub fingerprint: DeviceFingerprint,

    pub is_secondary: bool,
    pub is_using_home_id_from_other_network: bool,
    pub sis_present: bool,
    pub was_real_primary: bool,
    pub is_static_update_controller: bool,
    // Known only after GetSerialApiInitData
    #[builder(default)]
    pub is_slave: bool,
    #[builder(default)]
    pub supports_timers: bool,

    pub supported_function_types: Vec<FunctionType>,
    #[builder(
        default,
        setter(skip)
    )]
    supported_function_lookup: HashSet<FunctionType>,

    // Inclusion / exclusion / heal runtime state
    #[builder(default, setter(skip))]
    pub inclusion_active: bool,
    #[builder(default, setter(skip))]
    pub exclusion_active: bool,
    #[builder(default, setter(skip))]
    pub include_non_secure: bool,
    #[builder(default, setter(skip))]
    pub include_controller: bool,
    #[builder(default, setter(skip))]
    pub heal_active: bool,
    #[builder(default, setter(skip))]
    pub heal_progress: BTreeMap<NodeId, HealNodeStatus>,

    #[builder(default, setter(skip))]
    pub pending_node: PendingNode,

    // Single-shot signals, settled from the status report handlers
    #[builder(default, setter(skip))]
    pub begin_inclusion_signal: Option<oneshot::Sender<Result<bool>>>,
    #[builder(default, setter(skip))]
    pub stop_inclusion_signal: Option<oneshot::Sender<bool>>,
    #[builder(default, setter(skip))]
    pub begin_exclusion_signal: Option<oneshot::Sender<Result<bool>>>,
    #[builder(default, setter(skip))]
    pub stop_exclusion_signal: Option<oneshot::Sender<bool>>,
    #[builder(default, setter(skip))]
    pub replace_failed_signal: Option<oneshot::Sender<Result<bool>>>,
    #[builder(default, setter(skip))]
    pub hard_reset_signal: Option<oneshot::Sender<()>>,
}

impl ControllerStorage {
    pub fn supports_function(&self, function_type: FunctionType) -> bool {
        if self.supported_function_lookup.is_empty() {
            self.supported_function_types.contains(&function_type)
        } else {
            self.supported_function_lookup.contains(&function_type)
        }
    }

    /// Rebuilds the O(1) membership index from the reported function list
    pub fn index_supported_functions(&mut self) {
        self.supported_function_lookup = self.supported_function_types.iter().copied().collect();
    }
}

/// The node a long-running network operation is currently working on.
/// At most one operation can have a pending node at any time.
#[derive(Debug, Default)]
pub(crate) enum PendingNode {
    #[default]
    Idle,
    Inclusion {
        node_id: NodeId,
        info: ApplicationNodeInformation,
    },
    Exclusion {
        node_id: NodeId,
    },
    Replace {
        node_id: NodeId,
    },
}

impl PendingNode {
    pub fn is_idle(&self) -> bool {
        matches!(self, PendingNode::Idle)
    }
}
