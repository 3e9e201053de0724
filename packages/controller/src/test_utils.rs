//! Shared fixtures: a scripted transport actor servicing the [SerialApi]
//! channel plus a small simulation of the nodes on the other side of it.

use crate::controller::ControllerStorage;
use crate::node::{CommandClassInfo, NodeStorage};
use crate::{
    CommandPredicate, Controller, ControllerOptions, Ready, SerialApi, SerialApiAdapter,
    SerialApiInput,
};
use futures::StreamExt;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};
use zwnet_cc::commandclass::{
    AssociationCCReport, AssociationCCSupportedGroupingsReport,
    AssociationGroupInfoCCCommandListReport, AssociationGroupInfoCCInfoReport,
    AssociationGroupInfoCCNameReport, AssociationGroupProfile, CC, CCAddressable,
    EndpointDestination, MultiChannelAssociationCCReport,
    MultiChannelAssociationCCSupportedGroupingsReport, SecurityCCNetworkKeyVerify,
    SecurityCCNonceReport, SecurityCCSchemeReport, VersionCCCommandClassReport,
    WakeUpCCIntervalReport, WithAddress,
};
use zwnet_core::prelude::*;
use zwnet_serial::command::*;
use zwnet_serial::error::{ExecCommandError, ExecCommandResult};

pub(crate) const OWN_NODE_ID: NodeId = NodeId::new(1);

pub(crate) struct MockAnswer {
    pub result: ExecCommandResult<Option<Command>>,
    /// Unsolicited commands delivered through the controller right after the result
    pub follow_ups: Vec<Command>,
}

impl MockAnswer {
    pub fn ok(command: impl Into<Command>) -> Self {
        Self {
            result: Ok(Some(command.into())),
            follow_ups: Vec::new(),
        }
    }

    pub fn ack() -> Self {
        Self {
            result: Ok(None),
            follow_ups: Vec::new(),
        }
    }

    pub fn err(error: ExecCommandError) -> Self {
        Self {
            result: Err(error),
            follow_ups: Vec::new(),
        }
    }
}

pub(crate) type Responder = Box<dyn FnMut(&Command) -> MockAnswer + Send>;

pub(crate) struct MockSerial {
    pub sent: Arc<Mutex<Vec<Command>>>,
    pub rejected: Arc<Mutex<Vec<CommandPredicate>>>,
    controller_slot: Arc<Mutex<Option<Controller<Ready>>>>,
}

impl MockSerial {
    pub fn attach(&self, controller: &Controller<Ready>) {
        self.controller_slot
            .lock()
            .unwrap()
            .replace(controller.clone());
    }

    pub fn sent_of_type(&self, function_type: FunctionType) -> Vec<Command> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|command| command.function_type() == function_type)
            .cloned()
            .collect()
    }
}

pub(crate) fn spawn_mock_serial(adapter: SerialApiAdapter, mut responder: Responder) -> MockSerial {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let rejected = Arc::new(Mutex::new(Vec::new()));
    let controller_slot: Arc<Mutex<Option<Controller<Ready>>>> = Arc::new(Mutex::new(None));

    let mock = MockSerial {
        sent: sent.clone(),
        rejected: rejected.clone(),
        controller_slot: controller_slot.clone(),
    };

    let mut input_rx = adapter.input_rx;
    tokio::spawn(async move {
        while let Some(input) = input_rx.next().await {
            match input {
                SerialApiInput::ExecCommand {
                    command, callback, ..
                } => {
                    sent.lock().unwrap().push(command.clone());
                    let answer = responder(&command);
                    let _ = callback.send(answer.result);

                    if answer.follow_ups.is_empty() {
                        continue;
                    }
                    let controller = controller_slot.lock().unwrap().clone();
                    if let Some(controller) = controller {
                        for follow_up in answer.follow_ups {
                            let _ = controller.handle_serial_callback(follow_up).await;
                        }
                    }
                }
                SerialApiInput::RejectTransactions { predicate } => {
                    rejected.lock().unwrap().push(predicate);
                }
            }
        }
    });

    mock
}

/// The state of the simulated nodes behind the mock transport
#[derive(Default)]
pub(crate) struct SimState {
    pub associations: BTreeMap<(NodeId, u8), Vec<NodeId>>,
    pub mc_associations: BTreeMap<(NodeId, u8), (Vec<NodeId>, Vec<EndpointDestination>)>,
    pub supported_groupings: BTreeMap<NodeId, u8>,
    pub mc_supported_groupings: BTreeMap<NodeId, u8>,
    pub agi_names: BTreeMap<(NodeId, u8), String>,
    pub agi_profiles: BTreeMap<(NodeId, u8), AssociationGroupProfile>,
    pub agi_commands: BTreeMap<(NodeId, u8), Vec<CommandClasses>>,
    /// Nodes that do not acknowledge anything sent to them
    pub unreachable_nodes: BTreeSet<NodeId>,
}

/// A responder that simulates well-behaved nodes: CC queries are answered
/// from [SimState], routing and network management commands succeed.
pub(crate) fn simulator_responder(state: Arc<Mutex<SimState>>) -> Responder {
    Box::new(move |command| {
        let mut state = state.lock().unwrap();
        match command {
            Command::SendDataRequest(request) => {
                if state.unreachable_nodes.contains(&request.node_id) {
                    return MockAnswer::err(ExecCommandError::CallbackNOK(
                        SendDataCallback::builder()
                            .transmit_status(TransmitStatus::NoAck)
                            .build()
                            .into(),
                    ));
                }
                let reply = cc_auto_reply(&mut state, request.node_id, &request.command);
                let mut answer = MockAnswer::ok(
                    SendDataCallback::builder()
                        .transmit_status(TransmitStatus::Ok)
                        .build(),
                );
                if let Some(reply) = reply {
                    answer.follow_ups.push(wrap_cc_reply(request.node_id, reply));
                }
                answer
            }

            Command::AssignSucReturnRouteRequest(_) => MockAnswer::ok(
                AssignSucReturnRouteCallback::builder().success(true).build(),
            ),
            Command::AssignReturnRouteRequest(_) => {
                MockAnswer::ok(AssignReturnRouteCallback::builder().success(true).build())
            }
            Command::DeleteReturnRouteRequest(_) => {
                MockAnswer::ok(DeleteReturnRouteCallback::builder().success(true).build())
            }
            Command::RequestNodeNeighborUpdateRequest(_) => MockAnswer::ok(
                RequestNodeNeighborUpdateReport::builder()
                    .update_status(NodeNeighborUpdateStatus::UpdateDone)
                    .build(),
            ),
            Command::GetRoutingInfoRequest(_) => {
                MockAnswer::ok(GetRoutingInfoResponse::builder().build())
            }
            Command::GetNodeProtocolInfoRequest(_) => {
                MockAnswer::ok(GetNodeProtocolInfoResponse {
                    protocol_info: NodeInformationProtocolData::builder()
                        .device_class(DeviceClass::new(0x04, 0x10, 0x01))
                        .build(),
                })
            }

            Command::SetSucNodeIdRequest(_) => {
                MockAnswer::ok(SetSucNodeIdResponse { was_executed: true })
            }
            Command::HardResetRequest(_) => {
                let mut answer = MockAnswer::ack();
                answer
                    .follow_ups
                    .push(HardResetCallback::builder().build().into());
                answer
            }
            Command::ReplaceFailedNodeRequest(_) => MockAnswer::ok(ReplaceFailedNodeResponse {
                start_flags: FailedNodeStartFlags(0),
            }),
            Command::RemoveFailedNodeRequest(_) => MockAnswer::ok(
                RemoveFailedNodeCallback::builder()
                    .status(RemoveFailedNodeStatus::NodeRemoved)
                    .build(),
            ),

            _ => MockAnswer::ack(),
        }
    })
}

fn cc_auto_reply(state: &mut SimState, node_id: NodeId, cc: &CC) -> Option<CC> {
    match cc {
        CC::AssociationCCSet(set) => {
            let destinations = state
                .associations
                .entry((node_id, set.group_id))
                .or_default();
            for id in &set.node_ids {
                if !destinations.contains(id) {
                    destinations.push(*id);
                }
            }
            None
        }
        CC::AssociationCCGet(get) => {
            let destinations = state
                .associations
                .get(&(node_id, get.group_id))
                .cloned()
                .unwrap_or_default();
            Some(
                AssociationCCReport::builder()
                    .group_id(get.group_id)
                    .max_nodes(5)
                    .node_ids(destinations)
                    .build()
                    .into(),
            )
        }
        CC::AssociationCCRemove(remove) => {
            match remove.group_id {
                Some(group_id) => {
                    if let Some(destinations) = state.associations.get_mut(&(node_id, group_id)) {
                        destinations.retain(|id| !remove.node_ids.contains(id));
                    }
                }
                None => {
                    for ((owner, _), destinations) in state.associations.iter_mut() {
                        if *owner == node_id {
                            destinations.retain(|id| !remove.node_ids.contains(id));
                        }
                    }
                }
            }
            None
        }

        CC::MultiChannelAssociationCCSet(set) => {
            let (node_ids, endpoints) = state
                .mc_associations
                .entry((node_id, set.group_id))
                .or_default();
            for id in &set.node_ids {
                if !node_ids.contains(id) {
                    node_ids.push(*id);
                }
            }
            for endpoint in &set.endpoints {
                if !endpoints.contains(endpoint) {
                    endpoints.push(*endpoint);
                }
            }
            None
        }
        CC::MultiChannelAssociationCCGet(get) => {
            let (node_ids, endpoints) = state
                .mc_associations
                .get(&(node_id, get.group_id))
                .cloned()
                .unwrap_or_default();
            Some(
                MultiChannelAssociationCCReport::builder()
                    .group_id(get.group_id)
                    .max_nodes(5)
                    .node_ids(node_ids)
                    .endpoints(endpoints)
                    .build()
                    .into(),
            )
        }
        CC::MultiChannelAssociationCCRemove(remove) => {
            let groups: Vec<(NodeId, u8)> = state
                .mc_associations
                .keys()
                .filter(|(id, group_id)| {
                    *id == node_id && remove.group_id.map(|g| g == *group_id).unwrap_or(true)
                })
                .copied()
                .collect();
            for key in groups {
                if let Some((node_ids, endpoints)) = state.mc_associations.get_mut(&key) {
                    node_ids.retain(|id| !remove.node_ids.contains(id));
                    endpoints.retain(|e| !remove.endpoints.contains(e));
                }
            }
            None
        }

        CC::AssociationCCSupportedGroupingsGet(_) => Some(
            AssociationCCSupportedGroupingsReport {
                groups_count: state
                    .supported_groupings
                    .get(&node_id)
                    .copied()
                    .unwrap_or(0),
            }
            .into(),
        ),
        CC::MultiChannelAssociationCCSupportedGroupingsGet(_) => Some(
            MultiChannelAssociationCCSupportedGroupingsReport {
                groups_count: state
                    .mc_supported_groupings
                    .get(&node_id)
                    .copied()
                    .unwrap_or(0),
            }
            .into(),
        ),
        CC::AssociationGroupInfoCCNameGet(get) => Some(
            AssociationGroupInfoCCNameReport {
                group_id: get.group_id,
                name: state
                    .agi_names
                    .get(&(node_id, get.group_id))
                    .cloned()
                    .unwrap_or_default(),
            }
            .into(),
        ),
        CC::AssociationGroupInfoCCInfoGet(get) => Some(
            AssociationGroupInfoCCInfoReport {
                group_id: get.group_id,
                profile: state
                    .agi_profiles
                    .get(&(node_id, get.group_id))
                    .copied()
                    .unwrap_or(AssociationGroupProfile::GeneralNA),
            }
            .into(),
        ),
        CC::AssociationGroupInfoCCCommandListGet(get) => Some(
            AssociationGroupInfoCCCommandListReport {
                group_id: get.group_id,
                commands: state
                    .agi_commands
                    .get(&(node_id, get.group_id))
                    .cloned()
                    .unwrap_or_default(),
            }
            .into(),
        ),

        CC::SecurityCCSchemeGet(_) | CC::SecurityCCSchemeInherit(_) => Some(
            SecurityCCSchemeReport {
                supported_schemes: 0,
            }
            .into(),
        ),
        CC::SecurityCCNonceGet(_) => Some(
            SecurityCCNonceReport {
                nonce: vec![1, 2, 3, 4, 5, 6, 7, 8],
            }
            .into(),
        ),
        CC::SecurityCCNetworkKeySet(_) => Some(SecurityCCNetworkKeyVerify::default().into()),

        CC::VersionCCCommandClassGet(get) => Some(
            VersionCCCommandClassReport {
                requested_cc: get.requested_cc,
                version: 1,
            }
            .into(),
        ),
        CC::WakeUpCCIntervalGet(_) => Some(
            WakeUpCCIntervalReport::builder()
                .interval_seconds(3600)
                .controller_node_id(NodeId::unspecified())
                .build()
                .into(),
        ),

        _ => None,
    }
}

fn wrap_cc_reply(node_id: NodeId, reply: CC) -> Command {
    let command: WithAddress<CC> = reply
        .with_destination(OWN_NODE_ID.into())
        .with_source_node_id(node_id);
    ApplicationCommandRequest { command }.into()
}

pub(crate) fn test_storage() -> ControllerStorage {
    let mut storage = ControllerStorage::builder()
        .home_id(0xc0ffee11)
        .own_node_id(OWN_NODE_ID)
        .suc_node_id(Some(OWN_NODE_ID))
        .library_version("Z-Wave 7.17")
        .library_type(ZWaveLibraryType::StaticController)
        .serial_api_version("1.0")
        .fingerprint(DeviceFingerprint::new(0x0086, 0x0001, 0x0002))
        .is_secondary(false)
        .is_using_home_id_from_other_network(false)
        .sis_present(false)
        .was_real_primary(true)
        .is_static_update_controller(true)
        .supported_function_types(vec![
            FunctionType::GetSerialApiInitData,
            FunctionType::GetControllerCapabilities,
            FunctionType::SetSerialApiTimeouts,
            FunctionType::GetSerialApiCapabilities,
            FunctionType::SendData,
            FunctionType::GetControllerVersion,
            FunctionType::GetControllerId,
            FunctionType::HardReset,
            FunctionType::AssignReturnRoute,
            FunctionType::DeleteReturnRoute,
            FunctionType::RequestNodeNeighborUpdate,
            FunctionType::AddNodeToNetwork,
            FunctionType::RemoveNodeFromNetwork,
            FunctionType::AssignSucReturnRoute,
            FunctionType::SetSucNodeId,
            FunctionType::GetSucNodeId,
            FunctionType::RemoveFailedNode,
            FunctionType::ReplaceFailedNode,
            FunctionType::GetRoutingInfo,
            FunctionType::GetNodeProtocolInfo,
        ])
        .build();
    storage.index_supported_functions();
    storage
}

pub(crate) fn node_with_ccs(ccs: &[CommandClasses]) -> NodeStorage {
    let mut storage = NodeStorage::placeholder();
    storage.status = NodeStatus::Alive;
    for cc in ccs {
        storage
            .root_mut()
            .cc_info
            .insert(*cc, CommandClassInfo::supported(1));
    }
    storage
}

pub(crate) struct Fixture {
    pub controller: Controller<Ready>,
    pub mock: MockSerial,
    pub sim: Arc<Mutex<SimState>>,
}

/// A ready controller (own node 1) with empty placeholder nodes for the
/// given IDs, backed by the simulator responder
pub(crate) async fn test_controller_with_nodes(node_ids: &[u8]) -> Fixture {
    let mut nodes = BTreeMap::new();
    nodes.insert(OWN_NODE_ID, {
        let mut own = NodeStorage::placeholder();
        own.status = NodeStatus::Alive;
        own
    });
    for id in node_ids {
        nodes.insert(NodeId::new(*id), node_with_ccs(&[]));
    }
    fixture_with_nodes(nodes).await
}

pub(crate) async fn fixture_with_nodes(nodes: BTreeMap<NodeId, NodeStorage>) -> Fixture {
    fixture_with_options(nodes, ControllerOptions::default()).await
}

pub(crate) async fn fixture_with_options(
    nodes: BTreeMap<NodeId, NodeStorage>,
    options: ControllerOptions,
) -> Fixture {
    let sim = Arc::new(Mutex::new(SimState::default()));
    fixture_with_nodes_and_responder(nodes, options, simulator_responder(sim.clone()), sim).await
}

pub(crate) async fn fixture_with_nodes_and_responder(
    nodes: BTreeMap<NodeId, NodeStorage>,
    options: ControllerOptions,
    responder: Responder,
    sim: Arc<Mutex<SimState>>,
) -> Fixture {
    let (serial_api, adapter) = SerialApi::new();
    let mock = spawn_mock_serial(adapter, responder);
    let controller = Controller::test_instance(serial_api, options, test_storage(), nodes);
    mock.attach(&controller);
    Fixture {
        controller,
        mock,
        sim,
    }
}

/// An S0 security manager with a fixed test network key
pub(crate) fn network_key_manager() -> SecurityManager {
    let storage = SecurityManagerStorage::new(SecurityManagerOptions {
        own_node_id: OWN_NODE_ID,
        network_key: vec![0xa5; 16],
    });
    SecurityManager::new(Arc::new(storage))
}

/// Lets the spawned mock task and any controller tasks make progress
pub(crate) async fn settle() {
    for _ in 0..25 {
        tokio::task::yield_now().await;
    }
}

/// Drains all events that are currently queued on the receiver
pub(crate) fn drain_events(
    receiver: &mut futures::channel::mpsc::UnboundedReceiver<crate::ControllerEvent>,
) -> Vec<crate::ControllerEvent> {
    let mut events = Vec::new();
    while let Ok(Some(event)) = receiver.try_next() {
        events.push(event);
    }
    events
}
