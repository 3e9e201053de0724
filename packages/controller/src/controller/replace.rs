use super::PendingNode;
use crate::error::{ControllerError, Result};
use crate::node::NodeStorage;
use crate::{Controller, ControllerEvent, Node, Ready};
use futures::channel::oneshot;
use zwnet_core::prelude::*;
use zwnet_serial::command::{
    Command, RemoveFailedNodeCallback, RemoveFailedNodeRequest, RemoveFailedNodeStatus,
    ReplaceFailedNodeCallback, ReplaceFailedNodeRequest, ReplaceFailedNodeStatus,
};
use zwnet_serial::error::ExecCommandError;

impl Controller<Ready> {
    /// Replaces a failed node with a new one under the same node ID.
    /// Resolves with `true` once the stick has started the replacement, with
    /// `false` when an inclusion or exclusion is active.
    pub async fn replace_failed_node(
        &self,
        node_id: NodeId,
        include_non_secure: bool,
    ) -> Result<bool> {
        {
            let storage = self.storage();
            if storage.inclusion_active || storage.exclusion_active {
                return Ok(false);
            }
        }

        let node = self.get_node_or_err(&node_id)?;
        if node.ping().await? {
            return Err(ControllerError::ReplaceFailedNodeFailed(
                "the node responded to a ping and cannot be replaced".to_string(),
            ));
        }

        self.controller_log()
            .info(|| format!("starting replacement of failed node {}...", node_id));

        let cmd = ReplaceFailedNodeRequest::builder().node_id(node_id).build();
        let result = self.exec_controller_command(cmd, None).await;
        match result {
            Ok(Some(Command::ReplaceFailedNodeResponse(response)))
                if response.start_flags.is_ok() => {}
            Ok(Some(Command::ReplaceFailedNodeResponse(response))) => {
                return Err(ControllerError::ReplaceFailedNodeFailed(
                    response.start_flags.describe().join("\n"),
                ));
            }
            Err(ControllerError::Transport(ExecCommandError::ResponseNOK(
                Command::ReplaceFailedNodeResponse(response),
            ))) => {
                return Err(ControllerError::ReplaceFailedNodeFailed(
                    response.start_flags.describe().join("\n"),
                ));
            }
            Ok(_) => {
                return Err(ControllerError::Unexpected(
                    "expected ReplaceFailedNodeResponse".to_string(),
                ));
            }
            Err(e) => return Err(e),
        }

        let signal_rx = {
            let mut storage = self.storage_mut();
            storage.include_non_secure = include_non_secure;
            storage.pending_node = PendingNode::Replace { node_id };
            let (tx, rx) = oneshot::channel();
            storage.replace_failed_signal = Some(tx);
            rx
        };

        match signal_rx.await {
            Ok(result) => result,
            Err(_) => Err(ControllerError::Unexpected(
                "the replace signal went away".to_string(),
            )),
        }
    }

    pub(crate) async fn handle_replace_node_status_report(
        &self,
        callback: &ReplaceFailedNodeCallback,
    ) -> Result<bool> {
        match callback.status {
            ReplaceFailedNodeStatus::NodeOK => {
                let signal = {
                    let mut storage = self.storage_mut();
                    storage.pending_node = PendingNode::Idle;
                    storage.inclusion_active = false;
                    storage.replace_failed_signal.take()
                };
                if let Some(signal) = signal {
                    let _ = signal.send(Err(ControllerError::ReplaceFailedNodeOK));
                }
                self.emit(ControllerEvent::InclusionFailed);
            }

            ReplaceFailedNodeStatus::FailedNodeReplaceFailed => {
                let signal = {
                    let mut storage = self.storage_mut();
                    storage.pending_node = PendingNode::Idle;
                    storage.inclusion_active = false;
                    storage.replace_failed_signal.take()
                };
                if let Some(signal) = signal {
                    let _ = signal.send(Err(ControllerError::ReplaceFailedNodeFailed(
                        "the node could not be replaced".to_string(),
                    )));
                }
                self.emit(ControllerEvent::InclusionFailed);
            }

            ReplaceFailedNodeStatus::FailedNodeReplace => {
                let (signal, secure) = {
                    let mut storage = self.storage_mut();
                    storage.inclusion_active = true;
                    (
                        storage.replace_failed_signal.take(),
                        !storage.include_non_secure,
                    )
                };
                self.emit(ControllerEvent::InclusionStarted { secure });
                if let Some(signal) = signal {
                    let _ = signal.send(Ok(true));
                }
            }

            ReplaceFailedNodeStatus::FailedNodeReplaceDone => {
                self.emit(ControllerEvent::InclusionStopped);
                let pending = {
                    let mut storage = self.storage_mut();
                    storage.inclusion_active = false;
                    std::mem::take(&mut storage.pending_node)
                };

                match pending {
                    PendingNode::Replace { node_id } => {
                        self.controller_log()
                            .info(|| format!("node {} was replaced", node_id));

                        // Publish while the old registry entry still resolves
                        self.emit(ControllerEvent::NodeRemoved {
                            node_id,
                            replaced: true,
                        });
                        self.forget_node(node_id);

                        // The replacement joins under the same ID, but we know
                        // nothing about it yet. It never sends a NIF in this flow.
                        self.node_storage_mut()
                            .insert(node_id, NodeStorage::placeholder());
                        let node = Node::new(node_id, self.clone());
                        node.mark_as_alive();

                        if let Err(e) = self.assign_suc_return_route(node_id).await {
                            self.node_log(node_id, EndpointIndex::Root)
                                .warn(|| format!("failed to assign the SUC return route: {}", e));
                        }

                        self.secure_bootstrap_s0(&node, true).await;
                        self.bootstrap_lifeline_and_wakeup(&node).await;

                        self.emit(ControllerEvent::NodeAdded { node_id });
                    }
                    PendingNode::Idle => {}
                    other => {
                        self.storage_mut().pending_node = other;
                    }
                }
            }
        }
        Ok(true)
    }

    /// Removes a node from the stick's failed-node list, dropping it from the
    /// network without any participation of the node itself
    pub async fn remove_failed_node(&self, node_id: NodeId) -> Result<()> {
        let node = self.get_node_or_err(&node_id)?;
        if node.ping().await? {
            return Err(ControllerError::ReplaceFailedNodeFailed(
                "the node responded to a ping and cannot be removed".to_string(),
            ));
        }

        self.controller_log()
            .info(|| format!("removing failed node {}...", node_id));

        let cmd = RemoveFailedNodeRequest::builder().node_id(node_id).build();
        let result = self.exec_controller_command(cmd, None).await;
        match result {
            Ok(Some(Command::RemoveFailedNodeCallback(callback))) => {
                self.finish_remove_failed(node_id, &callback)
            }
            Err(ControllerError::Transport(ExecCommandError::CallbackNOK(
                Command::RemoveFailedNodeCallback(callback),
            ))) => self.finish_remove_failed(node_id, &callback),
            Ok(Some(Command::RemoveFailedNodeResponse(response))) => {
                Err(ControllerError::RemoveFailedNodeFailed(
                    response.start_flags.describe().join("\n"),
                ))
            }
            Err(ControllerError::Transport(ExecCommandError::ResponseNOK(
                Command::RemoveFailedNodeResponse(response),
            ))) => Err(ControllerError::RemoveFailedNodeFailed(
                response.start_flags.describe().join("\n"),
            )),
            Ok(_) => Err(ControllerError::Unexpected(
                "expected RemoveFailedNodeCallback".to_string(),
            )),
            Err(e) => Err(e),
        }
    }

    fn finish_remove_failed(
        &self,
        node_id: NodeId,
        callback: &RemoveFailedNodeCallback,
    ) -> Result<()> {
        match callback.status {
            RemoveFailedNodeStatus::NodeOK => Err(ControllerError::RemoveFailedNodeOK),
            RemoveFailedNodeStatus::NodeNotRemoved => Err(
                ControllerError::RemoveFailedNodeFailed("the node could not be removed".to_string()),
            ),
            RemoveFailedNodeStatus::NodeRemoved => {
                self.controller_log()
                    .info(|| format!("node {} was removed from the network", node_id));
                self.emit(ControllerEvent::NodeRemoved {
                    node_id,
                    replaced: false,
                });
                self.forget_node(node_id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{
        drain_events, node_with_ccs, settle, test_controller_with_nodes,
    };

    fn replace_callback(status: ReplaceFailedNodeStatus) -> Command {
        ReplaceFailedNodeCallback::builder().status(status).build().into()
    }

    #[tokio::test]
    async fn test_remove_failed_node_refuses_responding_node() {
        let fixture = test_controller_with_nodes(&[9]).await;
        let controller = &fixture.controller;

        // Node 9 responds to the ping, so it is not actually failed
        let result = controller.remove_failed_node(NodeId::new(9)).await;
        match result {
            Err(ControllerError::ReplaceFailedNodeFailed(message)) => {
                assert!(message.contains("responded to a ping"));
            }
            other => panic!("expected ReplaceFailedNodeFailed, got {:?}", other),
        }

        // The removal must not even have been requested
        assert!(
            fixture
                .mock
                .sent_of_type(FunctionType::RemoveFailedNode)
                .is_empty()
        );
        assert!(controller.get_node(&NodeId::new(9)).is_some());
    }

    #[tokio::test]
    async fn test_remove_failed_node_happy_path() {
        let fixture = test_controller_with_nodes(&[9]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();
        fixture
            .sim
            .lock()
            .unwrap()
            .unreachable_nodes
            .insert(NodeId::new(9));

        controller.remove_failed_node(NodeId::new(9)).await.unwrap();

        assert!(controller.get_node(&NodeId::new(9)).is_none());
        assert_eq!(
            drain_events(&mut events),
            vec![ControllerEvent::NodeRemoved {
                node_id: NodeId::new(9),
                replaced: false
            }]
        );
    }

    #[tokio::test]
    async fn test_replace_failed_node_happy_path() {
        let fixture = test_controller_with_nodes(&[]).await;
        let controller = fixture.controller.clone();
        {
            let mut nodes = controller.node_storage_mut();
            nodes.insert(
                NodeId::new(4),
                node_with_ccs(&[CommandClasses::BinarySwitch]),
            );
        }
        fixture
            .sim
            .lock()
            .unwrap()
            .unreachable_nodes
            .insert(NodeId::new(4));
        let mut events = controller.subscribe();

        let replace = {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller.replace_failed_node(NodeId::new(4), false).await
            })
        };
        settle().await;

        controller
            .handle_serial_callback(replace_callback(
                ReplaceFailedNodeStatus::FailedNodeReplace,
            ))
            .await
            .unwrap();
        assert!(replace.await.unwrap().unwrap());
        assert!(controller.inclusion_active());

        controller
            .handle_serial_callback(replace_callback(
                ReplaceFailedNodeStatus::FailedNodeReplaceDone,
            ))
            .await
            .unwrap();

        // The node keeps its ID but is a brand new device
        let node = controller.get_node(&NodeId::new(4)).expect("node 4 must exist");
        assert!(!node.supports_cc(CommandClasses::BinarySwitch));
        assert_eq!(node.status(), NodeStatus::Alive);
        assert!(!controller.inclusion_active());

        let events = drain_events(&mut events);
        assert_eq!(
            events,
            vec![
                ControllerEvent::InclusionStarted { secure: true },
                ControllerEvent::InclusionStopped,
                ControllerEvent::NodeRemoved {
                    node_id: NodeId::new(4),
                    replaced: true
                },
                ControllerEvent::NodeAdded {
                    node_id: NodeId::new(4)
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_replace_failed_node_node_ok() {
        let fixture = test_controller_with_nodes(&[4]).await;
        let controller = fixture.controller.clone();
        fixture
            .sim
            .lock()
            .unwrap()
            .unreachable_nodes
            .insert(NodeId::new(4));
        let mut events = controller.subscribe();

        let replace = {
            let controller = controller.clone();
            tokio::spawn(async move {
                controller.replace_failed_node(NodeId::new(4), false).await
            })
        };
        settle().await;

        controller
            .handle_serial_callback(replace_callback(ReplaceFailedNodeStatus::NodeOK))
            .await
            .unwrap();

        let result = replace.await.unwrap();
        assert!(matches!(result, Err(ControllerError::ReplaceFailedNodeOK)));
        assert_eq!(
            drain_events(&mut events),
            vec![ControllerEvent::InclusionFailed]
        );
    }

    #[tokio::test]
    async fn test_replace_failed_node_refused_during_inclusion() {
        let fixture = test_controller_with_nodes(&[4]).await;
        let controller = fixture.controller.clone();
        controller.storage_mut().inclusion_active = true;

        assert!(
            !controller
                .replace_failed_node(NodeId::new(4), false)
                .await
                .unwrap()
        );
    }
}
