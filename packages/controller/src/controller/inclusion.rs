use super::PendingNode;
use crate::error::{ControllerError, Result};
use crate::node::NodeStorage;
use crate::{Controller, ControllerEvent, Node, Ready, SendCommandOptions};
use futures::channel::oneshot;
use zwnet_core::prelude::*;
use zwnet_serial::command::{AddNodeStatus, AddNodeToNetworkCallback, AddNodeToNetworkRequest};

impl Controller<Ready> {
    /// Puts the stick into inclusion mode. Resolves with `true` once the
    /// stick has acknowledged readiness, with `false` when another network
    /// operation is already active, and fails with
    /// [ControllerError::InclusionFailed] when the stick refuses.
    ///
    /// The rest of the flow is driven by the unsolicited status reports; a
    /// successful add is announced through [ControllerEvent::NodeAdded].
    pub async fn begin_inclusion(&self, include_non_secure: bool) -> Result<bool> {
        let signal_rx = {
            let mut storage = self.storage_mut();
            if storage.inclusion_active || storage.exclusion_active {
                return Ok(false);
            }
            storage.inclusion_active = true;
            storage.include_non_secure = include_non_secure;
            let (tx, rx) = oneshot::channel();
            storage.begin_inclusion_signal = Some(tx);
            rx
        };

        self.controller_log().info(|| "starting inclusion process...");

        let cmd = AddNodeToNetworkRequest::builder().build();
        let options = SendCommandOptions::controller_priority();
        if let Err(e) = self.exec_controller_command(cmd, Some(&options)).await {
            let mut storage = self.storage_mut();
            storage.inclusion_active = false;
            storage.begin_inclusion_signal = None;
            return Err(e);
        }

        match signal_rx.await {
            Ok(result) => result,
            Err(_) => Err(ControllerError::Unexpected(
                "the inclusion signal went away".to_string(),
            )),
        }
    }

    /// Leaves inclusion mode. Returns `false` when no inclusion is active.
    pub async fn stop_inclusion(&self) -> Result<bool> {
        let signal_rx = {
            let mut storage = self.storage_mut();
            if !storage.inclusion_active {
                return Ok(false);
            }
            let (tx, rx) = oneshot::channel();
            storage.stop_inclusion_signal = Some(tx);
            rx
        };

        self.controller_log().info(|| "stopping inclusion process...");

        if let Err(e) = self
            .exec_controller_command(
                AddNodeToNetworkRequest::stop(),
                Some(&SendCommandOptions::controller_priority()),
            )
            .await
        {
            self.storage_mut().stop_inclusion_signal = None;
            return Err(e);
        }

        Ok(signal_rx.await.unwrap_or(false))
    }

    /// Tells the stick to leave inclusion mode without waiting for the
    /// confirming Done status, which arrives through the handler
    pub(crate) async fn stop_inclusion_internal(&self) {
        let _ = self
            .exec_controller_command(
                AddNodeToNetworkRequest::stop(),
                Some(&SendCommandOptions::controller_priority()),
            )
            .await;
    }

    pub(crate) async fn handle_add_node_status_report(
        &self,
        callback: &AddNodeToNetworkCallback,
    ) -> Result<bool> {
        match callback.status {
            AddNodeStatus::Ready => {
                let (signal, secure) = {
                    let mut storage = self.storage_mut();
                    (
                        storage.begin_inclusion_signal.take(),
                        !storage.include_non_secure,
                    )
                };
                self.controller_log()
                    .info(|| "the controller is now ready to add nodes");
                if let Some(signal) = signal {
                    let _ = signal.send(Ok(true));
                }
                self.emit(ControllerEvent::InclusionStarted { secure });
            }

            AddNodeStatus::Failed => {
                let begin_signal = self.storage_mut().begin_inclusion_signal.take();
                match begin_signal {
                    Some(signal) => {
                        // The stick refused to even enter inclusion mode
                        let _ = signal.send(Err(ControllerError::InclusionFailed));
                        self.stop_inclusion_internal().await;
                    }
                    None => {
                        self.controller_log().warn(|| "adding the node failed");
                        self.emit(ControllerEvent::InclusionFailed);
                        self.stop_inclusion_internal().await;
                    }
                }
                let mut storage = self.storage_mut();
                storage.inclusion_active = false;
                storage.include_controller = false;
                storage.pending_node = PendingNode::Idle;
            }

            AddNodeStatus::AddingController | AddNodeStatus::AddingSlave => {
                if callback.status == AddNodeStatus::AddingController {
                    self.storage_mut().include_controller = true;
                }
                if let Some(context) = &callback.status_context {
                    let info = context.node_info.clone().unwrap_or_else(|| {
                        ApplicationNodeInformation::builder()
                            .device_class(DeviceClass::new(0, 0, 0))
                            .build()
                    });
                    self.storage_mut().pending_node = PendingNode::Inclusion {
                        node_id: context.node_id,
                        info,
                    };
                }
            }

            AddNodeStatus::ProtocolDone => {
                self.stop_inclusion_internal().await;
            }

            AddNodeStatus::Done => {
                self.handle_inclusion_done().await;
            }

            _ => return Ok(false),
        }
        Ok(true)
    }

    async fn handle_inclusion_done(&self) {
        // Resolve a pending user stop first, it must not wait for the bootstrap
        let (stop_signal, pending, secure) = {
            let mut storage = self.storage_mut();
            let stop_signal = storage.stop_inclusion_signal.take();
            let pending = std::mem::take(&mut storage.pending_node);
            storage.inclusion_active = false;
            (stop_signal, pending, !storage.include_non_secure)
        };
        if let Some(signal) = stop_signal {
            let _ = signal.send(true);
        }

        match pending {
            PendingNode::Inclusion { node_id, .. } if node_id == NodeId::broadcast() => {
                self.controller_log()
                    .warn(|| "cannot add a node with the broadcast node ID, aborting");
                self.storage_mut().include_controller = false;
            }

            PendingNode::Inclusion { node_id, info } => {
                self.emit(ControllerEvent::InclusionStopped);
                self.controller_log()
                    .info(|| format!("node {} was added to the network", node_id));

                {
                    let mut nodes = self.node_storage_mut();
                    nodes.insert(node_id, NodeStorage::from_node_info(&info));
                }
                let node = Node::new(node_id, self.clone());
                node.mark_as_alive();

                // Give the new node a route to us before anything talks to it
                if let Err(e) = self.assign_suc_return_route(node_id).await {
                    self.node_log(node_id, EndpointIndex::Root)
                        .warn(|| format!("failed to assign the SUC return route: {}", e));
                }

                if secure {
                    self.secure_bootstrap_s0(&node, false).await;
                }
                self.bootstrap_lifeline_and_wakeup(&node).await;

                self.storage_mut().include_controller = false;
                self.emit(ControllerEvent::NodeAdded { node_id });
            }

            PendingNode::Idle => {
                self.emit(ControllerEvent::InclusionStopped);
            }

            other => {
                // A pending exclusion or replace is not ours to touch
                self.storage_mut().pending_node = other;
                self.emit(ControllerEvent::InclusionStopped);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{drain_events, settle, test_controller_with_nodes};
    use zwnet_serial::command::{AddNodeStatusContext, Command};

    fn add_node_callback(status: AddNodeStatus) -> Command {
        AddNodeToNetworkCallback::builder().status(status).build().into()
    }

    #[tokio::test]
    async fn test_inclusion_happy_path() {
        let fixture = test_controller_with_nodes(&[]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        let begin = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.begin_inclusion(false).await })
        };
        settle().await;

        controller
            .handle_serial_callback(add_node_callback(AddNodeStatus::Ready))
            .await
            .unwrap();
        assert!(begin.await.unwrap().unwrap());
        assert!(controller.inclusion_active());

        let new_node = AddNodeToNetworkCallback::builder()
            .status(AddNodeStatus::AddingSlave)
            .status_context(
                AddNodeStatusContext::builder()
                    .node_id(NodeId::new(7))
                    .node_info(
                        ApplicationNodeInformation::builder()
                            .device_class(DeviceClass::new(0x04, 0x10, 0x01))
                            .supported_ccs(vec![
                                CommandClasses::BinarySwitch,
                                CommandClasses::Version,
                            ])
                            .build(),
                    )
                    .build(),
            )
            .build();
        controller
            .handle_serial_callback(new_node.into())
            .await
            .unwrap();
        controller
            .handle_serial_callback(add_node_callback(AddNodeStatus::ProtocolDone))
            .await
            .unwrap();
        controller
            .handle_serial_callback(add_node_callback(AddNodeStatus::Done))
            .await
            .unwrap();

        let node = controller.get_node(&NodeId::new(7)).expect("node 7 must exist");
        assert_eq!(node.status(), NodeStatus::Alive);
        assert!(node.supports_cc(CommandClasses::BinarySwitch));
        assert!(node.supports_cc(CommandClasses::Version));
        // No security manager is configured, so S0 must not have run
        assert!(!node.is_secure());
        assert!(!controller.inclusion_active());

        let events = drain_events(&mut events);
        assert_eq!(
            events,
            vec![
                ControllerEvent::InclusionStarted { secure: true },
                ControllerEvent::InclusionStopped,
                ControllerEvent::NodeAdded {
                    node_id: NodeId::new(7)
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_inclusion_failed_before_ready() {
        let fixture = test_controller_with_nodes(&[]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        let begin = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.begin_inclusion(false).await })
        };
        settle().await;

        controller
            .handle_serial_callback(add_node_callback(AddNodeStatus::Failed))
            .await
            .unwrap();

        let result = begin.await.unwrap();
        assert!(matches!(result, Err(ControllerError::InclusionFailed)));
        assert!(!controller.inclusion_active());

        let events = drain_events(&mut events);
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, ControllerEvent::InclusionStarted { .. }))
        );
    }

    #[tokio::test]
    async fn test_begin_inclusion_refused_while_exclusion_active() {
        let fixture = test_controller_with_nodes(&[]).await;
        let controller = fixture.controller.clone();

        let begin_exclusion = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.begin_exclusion().await })
        };
        settle().await;
        controller
            .handle_serial_callback(
                zwnet_serial::command::RemoveNodeFromNetworkCallback::builder()
                    .status(zwnet_serial::command::RemoveNodeStatus::Ready)
                    .build()
                    .into(),
            )
            .await
            .unwrap();
        assert!(begin_exclusion.await.unwrap().unwrap());

        // Inclusion and exclusion are mutually exclusive
        assert!(!controller.begin_inclusion(false).await.unwrap());
        assert!(controller.exclusion_active());
        assert!(!controller.inclusion_active());
    }

    #[tokio::test]
    async fn test_stop_inclusion_is_idempotent() {
        let fixture = test_controller_with_nodes(&[]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        assert!(!controller.stop_inclusion().await.unwrap());
        assert!(drain_events(&mut events).is_empty());
    }

    #[tokio::test]
    async fn test_done_with_broadcast_node_id_adds_nothing() {
        let fixture = test_controller_with_nodes(&[]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        let begin = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.begin_inclusion(false).await })
        };
        settle().await;
        controller
            .handle_serial_callback(add_node_callback(AddNodeStatus::Ready))
            .await
            .unwrap();
        assert!(begin.await.unwrap().unwrap());
        drain_events(&mut events);

        let bogus = AddNodeToNetworkCallback::builder()
            .status(AddNodeStatus::AddingSlave)
            .status_context(
                AddNodeStatusContext::builder()
                    .node_id(NodeId::broadcast())
                    .build(),
            )
            .build();
        controller.handle_serial_callback(bogus.into()).await.unwrap();
        controller
            .handle_serial_callback(add_node_callback(AddNodeStatus::Done))
            .await
            .unwrap();

        assert!(controller.get_node(&NodeId::broadcast()).is_none());
        assert!(!controller.inclusion_active());
        assert!(drain_events(&mut events).is_empty());
    }
}
