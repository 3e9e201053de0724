use crate::error::Result;
use crate::{Controller, ControllerEvent, InterviewStage, Ready};
use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeMap, BTreeSet};
use zwnet_core::prelude::*;
use zwnet_serial::command::{
    AssignReturnRouteRequest, AssignSucReturnRouteRequest, Command, CommandBase, CommandId,
    DeleteReturnRouteRequest, NodeNeighborUpdateStatus, RequestNodeNeighborUpdateReport,
    RequestNodeNeighborUpdateRequest,
};

/// The progress of a single node within a network heal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealNodeStatus {
    Pending,
    Done,
    Failed,
    Skipped,
}

const MAX_HEAL_ATTEMPTS: u32 = 5;
/// A node's return-route table holds at most this many destinations
const MAX_RETURN_ROUTES: usize = 4;

impl Controller<Ready> {
    /// Heals every reachable node in the network concurrently. Returns
    /// whether the heal was started; per-node progress and completion are
    /// announced through [ControllerEvent::HealNetworkProgress] and
    /// [ControllerEvent::HealNetworkDone].
    pub fn begin_healing_network(&self) -> bool {
        {
            let mut storage = self.storage_mut();
            if storage.heal_active {
                return false;
            }
            storage.heal_active = true;
            storage.heal_progress.clear();
        }
        self.controller_log().info(|| "healing the network...");

        let own_node_id = self.own_node_id();
        let mut statuses: Vec<(NodeId, HealNodeStatus)> = Vec::new();
        {
            let nodes = self.node_storage();
            for (node_id, node) in nodes.iter() {
                if *node_id == own_node_id {
                    continue;
                }
                // Dead nodes and sleeping nodes we can't even address yet
                // would only make the heal hang
                let skip = node.status == NodeStatus::Dead
                    || (node.status == NodeStatus::Asleep
                        && node.interview_stage <= InterviewStage::ProtocolInfo);
                statuses.push((
                    *node_id,
                    if skip {
                        HealNodeStatus::Skipped
                    } else {
                        HealNodeStatus::Pending
                    },
                ));
            }
        }

        let any_skipped = statuses
            .iter()
            .any(|(_, status)| *status == HealNodeStatus::Skipped);
        let pending: Vec<NodeId> = statuses
            .iter()
            .filter(|(_, status)| *status == HealNodeStatus::Pending)
            .map(|(node_id, _)| *node_id)
            .collect();
        {
            let mut storage = self.storage_mut();
            storage.heal_progress = statuses.into_iter().collect();
        }
        if any_skipped {
            self.emit(ControllerEvent::HealNetworkProgress(
                self.heal_network_progress(),
            ));
        }

        let this = self.clone();
        tokio::spawn(async move {
            let mut heals: FuturesUnordered<_> = pending
                .into_iter()
                .map(|node_id| {
                    let controller = this.clone();
                    async move { (node_id, controller.heal_node_internal(node_id).await) }
                })
                .collect();

            while let Some((node_id, success)) = heals.next().await {
                let snapshot = {
                    let mut storage = this.storage_mut();
                    if storage.heal_active {
                        storage.heal_progress.insert(
                            node_id,
                            if success {
                                HealNodeStatus::Done
                            } else {
                                HealNodeStatus::Failed
                            },
                        );
                        Some(storage.heal_progress.clone())
                    } else {
                        None
                    }
                };
                if let Some(snapshot) = snapshot {
                    this.emit(ControllerEvent::HealNetworkProgress(snapshot));
                }
            }

            let done_snapshot = {
                let mut storage = this.storage_mut();
                if storage.heal_active {
                    storage.heal_active = false;
                    Some(storage.heal_progress.clone())
                } else {
                    None
                }
            };
            if let Some(snapshot) = done_snapshot {
                this.controller_log().info(|| "network heal completed");
                this.emit(ControllerEvent::HealNetworkDone(snapshot));
            }
        });

        true
    }

    /// Aborts a running network heal. Pending per-node heals observe the
    /// cleared flag and short-circuit; in-flight routing requests are
    /// rejected at the transport.
    pub fn stop_healing_network(&self) -> bool {
        {
            let mut storage = self.storage_mut();
            if !storage.heal_active {
                return false;
            }
            storage.heal_active = false;
        }
        self.controller_log().info(|| "stopping network heal...");

        self.serial_api().reject_transactions(Box::new(|command| {
            matches!(
                command.function_type(),
                FunctionType::RequestNodeNeighborUpdate
                    | FunctionType::GetRoutingInfo
                    | FunctionType::DeleteReturnRoute
                    | FunctionType::AssignReturnRoute
            )
        }));
        true
    }

    /// A defensive copy of the per-node heal progress
    pub fn heal_network_progress(&self) -> BTreeMap<NodeId, HealNodeStatus> {
        self.storage().heal_progress.clone()
    }

    /// Heals a single node: refresh its neighbor list, read it back, then
    /// rebuild its return routes. Each phase is retried a bounded number of
    /// times; a cleared heal flag aborts between attempts.
    pub(crate) async fn heal_node_internal(&self, node_id: NodeId) -> bool {
        let log = self.node_log(node_id, EndpointIndex::Root);
        log.info(|| "healing node...");

        // Phase 1: make the node rediscover its neighbors
        let mut success = false;
        for attempt in 1..=MAX_HEAL_ATTEMPTS {
            if !self.heal_active() {
                return false;
            }
            log.debug(|| {
                format!(
                    "refreshing neighbor list (attempt {}/{})...",
                    attempt, MAX_HEAL_ATTEMPTS
                )
            });
            let cmd = RequestNodeNeighborUpdateRequest::builder()
                .node_id(node_id)
                .build();
            match self.exec_controller_command(cmd, None).await {
                Ok(Some(Command::RequestNodeNeighborUpdateReport(report)))
                    if report.update_status == NodeNeighborUpdateStatus::UpdateDone =>
                {
                    success = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    log.debug(|| format!("refreshing the neighbor list failed: {}", e));
                }
            }
        }
        if !success {
            log.warn(|| "failed to heal: the neighbor list could not be refreshed");
            return false;
        }

        // Phase 2: fetch the updated neighbor list
        let Some(node) = self.get_node(&node_id) else {
            return false;
        };
        success = false;
        for _ in 1..=MAX_HEAL_ATTEMPTS {
            if !self.heal_active() {
                return false;
            }
            match node.query_neighbors_internal().await {
                Ok(_) => {
                    success = true;
                    break;
                }
                Err(e) => {
                    log.debug(|| format!("querying the neighbor list failed: {}", e));
                }
            }
        }
        if !success {
            log.warn(|| "failed to heal: the neighbor list could not be queried");
            return false;
        }

        // Phase 3: drop the stale return routes
        success = false;
        for _ in 1..=MAX_HEAL_ATTEMPTS {
            if !self.heal_active() {
                return false;
            }
            let cmd = DeleteReturnRouteRequest::builder().node_id(node_id).build();
            match self.exec_controller_command(cmd, None).await {
                Ok(Some(Command::DeleteReturnRouteCallback(callback))) if callback.is_ok() => {
                    success = true;
                    break;
                }
                Ok(Some(Command::DeleteReturnRouteResponse(response))) if response.is_ok() => {
                    success = true;
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    log.debug(|| format!("deleting the return routes failed: {}", e));
                }
            }
        }
        if !success {
            log.warn(|| "failed to heal: the return routes could not be deleted");
            return false;
        }

        // Phase 4: assign fresh routes to everything the node reports to
        for target in self.return_route_targets(node_id) {
            success = false;
            for _ in 1..=MAX_HEAL_ATTEMPTS {
                if !self.heal_active() {
                    return false;
                }
                match self.assign_return_route(node_id, target).await {
                    Ok(true) => {
                        success = true;
                        break;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log.debug(|| {
                            format!("assigning the return route to {} failed: {}", target, e)
                        });
                    }
                }
            }
            if !success {
                log.warn(|| {
                    format!("failed to heal: no return route to {} could be assigned", target)
                });
                return false;
            }
        }

        log.info(|| "healed successfully");
        true
    }

    /// The destinations a node needs return routes for: ourselves first,
    /// then its association targets, capped at the table size of the stick
    pub(crate) fn return_route_targets(&self, node_id: NodeId) -> Vec<NodeId> {
        let own_node_id = self.own_node_id();
        let mut targets: BTreeSet<NodeId> = BTreeSet::new();
        {
            let nodes = self.node_storage();
            if let Some(storage) = nodes.get(&node_id) {
                let associations = &storage.associations;
                targets.extend(associations.destinations.values().flatten().copied());
                for destinations in associations.mc_destinations.values() {
                    targets.extend(destinations.node_ids.iter().copied());
                    targets.extend(destinations.endpoints.iter().map(|e| e.node_id));
                }
            }
        }
        targets.remove(&own_node_id);

        let mut result = vec![own_node_id];
        result.extend(targets.into_iter().take(MAX_RETURN_ROUTES - 1));
        result
    }

    /// Teaches a node the route to reach another node directly
    pub async fn assign_return_route(
        &self,
        node_id: NodeId,
        destination_node_id: NodeId,
    ) -> Result<bool> {
        let cmd = AssignReturnRouteRequest::builder()
            .node_id(node_id)
            .destination_node_id(destination_node_id)
            .build();
        let response = self.exec_controller_command(cmd, None).await?;
        Ok(match response {
            Some(Command::AssignReturnRouteCallback(callback)) => callback.is_ok(),
            Some(Command::AssignReturnRouteResponse(response)) => response.is_ok(),
            _ => false,
        })
    }

    /// Teaches a node the route to reach the SUC
    pub async fn assign_suc_return_route(&self, node_id: NodeId) -> Result<bool> {
        let cmd = AssignSucReturnRouteRequest::builder().node_id(node_id).build();
        let response = self.exec_controller_command(cmd, None).await?;
        let success = match response {
            Some(Command::AssignSucReturnRouteCallback(callback)) => callback.is_ok(),
            Some(Command::AssignSucReturnRouteResponse(response)) => response.is_ok(),
            _ => false,
        };
        if success {
            if let Some(node) = self.get_node(&node_id) {
                node.set_has_suc_return_route(true);
            }
        }
        Ok(success)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{
        MockAnswer, SimState, drain_events, fixture_with_nodes_and_responder, settle,
        simulator_responder, test_controller_with_nodes,
    };
    use crate::{ControllerOptions, node::NodeStorage};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    async fn wait_for_done(
        events: &mut futures::channel::mpsc::UnboundedReceiver<ControllerEvent>,
    ) -> Option<BTreeMap<NodeId, HealNodeStatus>> {
        let next_done = async {
            while let Some(event) = events.next().await {
                if let ControllerEvent::HealNetworkDone(snapshot) = event {
                    return Some(snapshot);
                }
            }
            None
        };
        tokio::time::timeout(Duration::from_secs(1), next_done)
            .await
            .ok()
            .flatten()
    }

    #[tokio::test]
    async fn test_network_heal_covers_all_nodes_and_terminates() {
        let fixture = test_controller_with_nodes(&[2, 3]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        assert!(controller.begin_healing_network());
        // A second heal cannot start while the first is running
        assert!(!controller.begin_healing_network());

        let progress = controller.heal_network_progress();
        assert_eq!(
            progress.keys().copied().collect::<Vec<_>>(),
            vec![NodeId::new(2), NodeId::new(3)]
        );

        let done = wait_for_done(&mut events).await.expect("heal must finish");
        assert_eq!(done.get(&NodeId::new(2)), Some(&HealNodeStatus::Done));
        assert_eq!(done.get(&NodeId::new(3)), Some(&HealNodeStatus::Done));
        assert!(!controller.heal_active());

        // Exactly one done event
        assert!(wait_for_done(&mut events).await.is_none());
    }

    #[tokio::test]
    async fn test_network_heal_skips_dead_and_sleeping_nodes() {
        let fixture = test_controller_with_nodes(&[2]).await;
        let controller = fixture.controller.clone();
        {
            let mut nodes = controller.node_storage_mut();
            let mut dead = NodeStorage::placeholder();
            dead.status = NodeStatus::Dead;
            nodes.insert(NodeId::new(4), dead);

            let mut asleep = NodeStorage::placeholder();
            asleep.status = NodeStatus::Asleep;
            nodes.insert(NodeId::new(5), asleep);
        }
        let mut events = controller.subscribe();

        assert!(controller.begin_healing_network());
        let done = wait_for_done(&mut events).await.expect("heal must finish");

        assert_eq!(done.get(&NodeId::new(2)), Some(&HealNodeStatus::Done));
        assert_eq!(done.get(&NodeId::new(4)), Some(&HealNodeStatus::Skipped));
        assert_eq!(done.get(&NodeId::new(5)), Some(&HealNodeStatus::Skipped));
    }

    #[tokio::test]
    async fn test_stop_heal_suppresses_done_and_rejects_routing_messages() {
        let fixture = test_controller_with_nodes(&[2, 3]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        assert!(controller.begin_healing_network());
        // Let the per-node heals enter their first phase, then abort
        tokio::task::yield_now().await;
        assert!(controller.stop_healing_network());
        settle().await;

        assert!(!controller.heal_active());
        let events = drain_events(&mut events);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, ControllerEvent::HealNetworkDone(_)))
        );

        // The transport was asked to drop the in-flight routing messages
        let rejected = fixture.mock.rejected.lock().unwrap();
        assert_eq!(rejected.len(), 1);
        let predicate = &rejected[0];
        let routing_command: Command = RequestNodeNeighborUpdateRequest::builder()
            .node_id(NodeId::new(2))
            .build()
            .into();
        assert!(predicate(&routing_command));
        let unrelated: Command =
            zwnet_serial::command::GetSucNodeIdRequest::default().into();
        assert!(!predicate(&unrelated));

        // Stopping again is a no-op
        assert!(!controller.stop_healing_network());
    }

    #[tokio::test]
    async fn test_failed_heal_is_recorded() {
        let sim = Arc::new(Mutex::new(SimState::default()));
        let mut inner = simulator_responder(sim.clone());
        let responder = Box::new(move |command: &Command| {
            if let Command::RequestNodeNeighborUpdateRequest(_) = command {
                return MockAnswer::ok(
                    RequestNodeNeighborUpdateReport::builder()
                        .update_status(NodeNeighborUpdateStatus::UpdateFailed)
                        .build(),
                );
            }
            inner(command)
        });

        let mut nodes = BTreeMap::new();
        nodes.insert(crate::test_utils::OWN_NODE_ID, NodeStorage::placeholder());
        nodes.insert(NodeId::new(2), NodeStorage::placeholder());
        let fixture = fixture_with_nodes_and_responder(
            nodes,
            ControllerOptions::default(),
            responder,
            sim,
        )
        .await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        assert!(controller.begin_healing_network());
        let done = wait_for_done(&mut events).await.expect("heal must finish");
        assert_eq!(done.get(&NodeId::new(2)), Some(&HealNodeStatus::Failed));
    }

    #[tokio::test]
    async fn test_return_route_targets_are_capped_and_deduplicated() {
        let fixture = test_controller_with_nodes(&[2]).await;
        let controller = &fixture.controller;
        {
            let mut nodes = controller.node_storage_mut();
            let associations = &mut nodes.get_mut(&NodeId::new(2)).unwrap().associations;
            associations.destinations.insert(
                1,
                vec![NodeId::new(7), NodeId::new(3), NodeId::new(7), NodeId::new(9)],
            );
            associations
                .destinations
                .insert(2, vec![NodeId::new(5), NodeId::new(1)]);
            associations.mc_destinations.entry(3).or_default().node_ids =
                vec![NodeId::new(6)];
        }

        let targets = controller.return_route_targets(NodeId::new(2));
        // Our own node ID always comes first
        assert_eq!(targets[0], NodeId::new(1));
        assert!(targets.len() <= 4);
        let unique: std::collections::BTreeSet<_> = targets.iter().collect();
        assert_eq!(unique.len(), targets.len());
    }
}
