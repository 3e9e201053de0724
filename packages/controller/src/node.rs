use crate::controller::expect_controller_command_result;
use crate::error::Result;
use crate::exec_node_command::ExecNodeCommandError;
use crate::{Controller, Ready};
use zwnet_cc::commandclass::{CC, CCAddressable, NoOperationCC, WithAddress};
use zwnet_core::prelude::*;
use zwnet_core::submodule;
use zwnet_logging::loggers::node::NodeLogger;
use zwnet_serial::command::{Command, GetNodeProtocolInfoRequest, GetRoutingInfoRequest};

submodule!(interview_stage);
mod storage;
pub use storage::CommandClassInfo;
pub(crate) use storage::{McDestinations, NodeStorage};

macro_rules! read_locked {
    ($self:ident, $field:ident) => {
        $self
            .controller
            .node_storage()
            .get(&$self.id)
            .map(|storage| storage.$field)
    };
}

macro_rules! with_storage {
    ($self:ident, $storage:ident => $body:expr) => {
        $self
            .controller
            .node_storage()
            .get(&$self.id)
            .map(|$storage| $body)
    };
}

macro_rules! with_storage_mut {
    ($self:ident, $storage:ident => $body:expr) => {
        if let Some($storage) = $self.controller.node_storage_mut().get_mut(&$self.id) {
            $body
        }
    };
}

/// A cheap handle to one node in the registry. The actual state lives in the
/// controller's node storage; handles stay valid across registry mutations
/// and simply read as empty once their node is gone.
#[derive(Clone)]
pub struct Node {
    id: NodeId,
    controller: Controller<Ready>,
}

impl Node {
    pub(crate) fn new(id: NodeId, controller: Controller<Ready>) -> Self {
        Self { id, controller }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn status(&self) -> NodeStatus {
        read_locked!(self, status).unwrap_or(NodeStatus::Unknown)
    }

    pub fn mark_as_alive(&self) {
        with_storage_mut!(self, storage => storage.status = NodeStatus::Alive);
    }

    pub fn mark_as_dead(&self) {
        with_storage_mut!(self, storage => storage.status = NodeStatus::Dead);
    }

    pub fn mark_as_asleep(&self) {
        with_storage_mut!(self, storage => storage.status = NodeStatus::Asleep);
    }

    pub fn interview_stage(&self) -> InterviewStage {
        read_locked!(self, interview_stage).unwrap_or(InterviewStage::None)
    }

    pub fn set_interview_stage(&self, interview_stage: InterviewStage) {
        with_storage_mut!(self, storage => storage.interview_stage = interview_stage);
    }

    pub fn device_class(&self) -> Option<DeviceClass> {
        with_storage!(self, storage => storage.protocol_data.device_class)
    }

    pub fn fingerprint(&self) -> Option<DeviceFingerprint> {
        with_storage!(self, storage => storage.fingerprint).flatten()
    }

    pub fn can_sleep(&self) -> bool {
        with_storage!(self, storage => {
            !storage.protocol_data.listening && !storage.protocol_data.frequent_listening
        })
        .unwrap_or(false)
    }

    pub fn is_secure(&self) -> bool {
        read_locked!(self, is_secure).unwrap_or(false)
    }

    pub fn set_is_secure(&self, is_secure: bool) {
        with_storage_mut!(self, storage => storage.is_secure = is_secure);
    }

    pub fn has_suc_return_route(&self) -> bool {
        read_locked!(self, has_suc_return_route).unwrap_or(false)
    }

    pub fn set_has_suc_return_route(&self, has_suc_return_route: bool) {
        with_storage_mut!(self, storage => storage.has_suc_return_route = has_suc_return_route);
    }

    pub fn is_zwave_plus(&self) -> bool {
        self.supports_cc(CommandClasses::ZWavePlusInfo)
    }

    pub fn supports_cc(&self, cc: CommandClasses) -> bool {
        with_storage!(self, storage => {
            storage
                .root()
                .cc_info
                .get(&cc)
                .map(|info| info.supported)
                .unwrap_or(false)
        })
        .unwrap_or(false)
    }

    pub fn cc_version(&self, cc: CommandClasses) -> Option<u8> {
        with_storage!(self, storage => storage.root().cc_info.get(&cc).map(|info| info.version))
            .flatten()
    }

    /// Marks the CC as supported with the given version, keeping any other
    /// flags that were already known
    pub fn add_cc(&self, cc: CommandClasses, version: u8) {
        with_storage_mut!(self, storage => {
            let info = storage.root_mut().cc_info.entry(cc).or_default();
            info.supported = true;
            info.version = version;
        });
    }

    pub fn remove_cc(&self, cc: CommandClasses) {
        with_storage_mut!(self, storage => {
            storage.root_mut().cc_info.remove(&cc);
        });
    }

    pub fn supported_command_classes(&self) -> Vec<CommandClasses> {
        with_storage!(self, storage => {
            storage
                .root()
                .cc_info
                .iter()
                .filter_map(|(cc, info)| if info.supported { Some(*cc) } else { None })
                .collect()
        })
        .unwrap_or_default()
    }

    pub fn endpoint_exists(&self, index: u8) -> bool {
        with_storage!(self, storage => {
            storage.endpoints.contains_key(&EndpointIndex::from(index))
        })
        .unwrap_or(false)
    }

    pub fn get_endpoint(&self, index: u8) -> Option<Endpoint> {
        if self.endpoint_exists(index) {
            Some(Endpoint {
                node: self.clone(),
                index: EndpointIndex::from(index),
            })
        } else {
            None
        }
    }

    pub fn neighbors(&self) -> Vec<NodeId> {
        with_storage!(self, storage => storage.neighbors.clone()).unwrap_or_default()
    }

    pub(crate) fn logger(&self) -> NodeLogger {
        self.controller.node_log(self.id, EndpointIndex::Root)
    }

    /// Pings the node and returns whether it responded or not.
    pub async fn ping(&self) -> Result<bool> {
        // ^ Although this is a node command, the only errors we want to surface are controller errors
        let cc: WithAddress<CC> =
            CC::from(NoOperationCC::default()).with_destination(self.id.into());
        let result = self.controller.exec_node_command(&cc, None).await;
        match result {
            Ok(_) => Ok(true),
            Err(ExecNodeCommandError::NodeNoAck) => Ok(false),
            Err(ExecNodeCommandError::NodeTimeout) => Ok(false),
            Err(ExecNodeCommandError::Transport(e)) => Err(e.into()),
        }
    }

    /// Asks the stick which neighbors it currently has recorded for this node
    /// and caches the answer
    pub(crate) async fn query_neighbors_internal(&self) -> Result<Vec<NodeId>> {
        let cmd = GetRoutingInfoRequest::builder().node_id(self.id).build();
        let response = self.controller.exec_controller_command(cmd, None).await;
        let response = expect_controller_command_result!(response, GetRoutingInfoResponse);

        with_storage_mut!(self, storage => storage.neighbors = response.node_ids.clone());
        Ok(response.node_ids)
    }

    /// Reads the protocol-level information the stick keeps about this node
    /// and caches it
    pub async fn refresh_protocol_info(&self) -> Result<NodeInformationProtocolData> {
        let cmd = GetNodeProtocolInfoRequest { node_id: self.id };
        let response = self.controller.exec_controller_command(cmd, None).await;
        let response = expect_controller_command_result!(response, GetNodeProtocolInfoResponse);

        with_storage_mut!(self, storage => {
            storage.protocol_data = response.protocol_info.clone();
            if storage.interview_stage < InterviewStage::ProtocolInfo {
                storage.interview_stage = InterviewStage::ProtocolInfo;
            }
        });
        Ok(response.protocol_info)
    }
}

/// A handle to one endpoint of a node. The root device counts as endpoint 0.
pub struct Endpoint {
    node: Node,
    index: EndpointIndex,
}

impl Endpoint {
    pub fn node_id(&self) -> NodeId {
        self.node.id()
    }

    pub fn index(&self) -> EndpointIndex {
        self.index
    }

    pub fn supports_cc(&self, cc: CommandClasses) -> bool {
        self.node
            .controller
            .node_storage()
            .get(&self.node.id)
            .and_then(|storage| storage.endpoints.get(&self.index))
            .and_then(|endpoint| endpoint.cc_info.get(&cc))
            .map(|info| info.supported)
            .unwrap_or(false)
    }

    /// Whether this endpoint supports any CC that drives a physical output
    pub fn supports_any_actuator_cc(&self) -> bool {
        ACTUATOR_CCS.iter().any(|cc| self.supports_cc(*cc))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ControllerError;
    use crate::test_utils::test_controller_with_nodes;

    #[tokio::test]
    async fn test_registry_lookup() {
        let fixture = test_controller_with_nodes(&[2]).await;
        let controller = &fixture.controller;

        assert!(controller.get_node(&NodeId::new(2)).is_some());
        assert!(controller.get_node(&NodeId::new(9)).is_none());
        assert!(matches!(
            controller.get_node_or_err(&NodeId::new(9)),
            Err(ControllerError::NodeNotFound(id)) if id == NodeId::new(9)
        ));
    }

    #[tokio::test]
    async fn test_cc_bookkeeping() {
        let fixture = test_controller_with_nodes(&[2]).await;
        let node = fixture.controller.get_node(&NodeId::new(2)).unwrap();

        assert!(!node.supports_cc(CommandClasses::BinarySwitch));
        node.add_cc(CommandClasses::BinarySwitch, 2);
        assert!(node.supports_cc(CommandClasses::BinarySwitch));
        assert_eq!(node.cc_version(CommandClasses::BinarySwitch), Some(2));

        node.remove_cc(CommandClasses::BinarySwitch);
        assert!(!node.supports_cc(CommandClasses::BinarySwitch));
    }

    #[tokio::test]
    async fn test_endpoint_lookup() {
        let fixture = test_controller_with_nodes(&[2]).await;
        let node = fixture.controller.get_node(&NodeId::new(2)).unwrap();

        // The root endpoint always exists, others must be discovered first
        assert!(node.endpoint_exists(0));
        assert!(!node.endpoint_exists(1));
        assert!(node.get_endpoint(0).is_some());
        assert!(node.get_endpoint(1).is_none());
    }

    #[tokio::test]
    async fn test_refresh_protocol_info() {
        let fixture = test_controller_with_nodes(&[2]).await;
        let node = fixture.controller.get_node(&NodeId::new(2)).unwrap();
        assert_eq!(node.interview_stage(), InterviewStage::None);

        let info = node.refresh_protocol_info().await.unwrap();
        assert_eq!(info.device_class, DeviceClass::new(0x04, 0x10, 0x01));
        assert_eq!(node.device_class(), Some(DeviceClass::new(0x04, 0x10, 0x01)));
        assert_eq!(node.interview_stage(), InterviewStage::ProtocolInfo);
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let fixture = test_controller_with_nodes(&[2]).await;
        let node = fixture.controller.get_node(&NodeId::new(2)).unwrap();

        node.mark_as_asleep();
        assert_eq!(node.status(), NodeStatus::Asleep);
        node.mark_as_dead();
        assert_eq!(node.status(), NodeStatus::Dead);
        node.mark_as_alive();
        assert_eq!(node.status(), NodeStatus::Alive);
    }
}
