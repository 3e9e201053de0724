use super::PendingNode;
use crate::error::{ControllerError, Result};
use crate::{Controller, ControllerEvent, Ready, SendCommandOptions};
use futures::channel::oneshot;
use zwnet_serial::command::{
    RemoveNodeFromNetworkCallback, RemoveNodeFromNetworkRequest, RemoveNodeStatus,
};

impl Controller<Ready> {
    /// Puts the stick into exclusion mode. Resolves with `true` once the
    /// stick has acknowledged readiness, with `false` when another network
    /// operation is already active, and fails with
    /// [ControllerError::ExclusionFailed] when the stick refuses.
    pub async fn begin_exclusion(&self) -> Result<bool> {
        let signal_rx = {
            let mut storage = self.storage_mut();
            if storage.inclusion_active || storage.exclusion_active {
                return Ok(false);
            }
            storage.exclusion_active = true;
            let (tx, rx) = oneshot::channel();
            storage.begin_exclusion_signal = Some(tx);
            rx
        };

        self.controller_log().info(|| "starting exclusion process...");

        let cmd = RemoveNodeFromNetworkRequest::builder().build();
        let options = SendCommandOptions::controller_priority();
        if let Err(e) = self.exec_controller_command(cmd, Some(&options)).await {
            let mut storage = self.storage_mut();
            storage.exclusion_active = false;
            storage.begin_exclusion_signal = None;
            return Err(e);
        }

        match signal_rx.await {
            Ok(result) => result,
            Err(_) => Err(ControllerError::Unexpected(
                "the exclusion signal went away".to_string(),
            )),
        }
    }

    /// Leaves exclusion mode. Returns `false` when no exclusion is active.
    pub async fn stop_exclusion(&self) -> Result<bool> {
        let signal_rx = {
            let mut storage = self.storage_mut();
            if !storage.exclusion_active {
                return Ok(false);
            }
            let (tx, rx) = oneshot::channel();
            storage.stop_exclusion_signal = Some(tx);
            rx
        };

        self.controller_log().info(|| "stopping exclusion process...");

        if let Err(e) = self
            .exec_controller_command(
                RemoveNodeFromNetworkRequest::stop(),
                Some(&SendCommandOptions::controller_priority()),
            )
            .await
        {
            self.storage_mut().stop_exclusion_signal = None;
            return Err(e);
        }

        Ok(signal_rx.await.unwrap_or(false))
    }

    pub(crate) async fn stop_exclusion_internal(&self) {
        let _ = self
            .exec_controller_command(
                RemoveNodeFromNetworkRequest::stop(),
                Some(&SendCommandOptions::controller_priority()),
            )
            .await;
    }

    pub(crate) async fn handle_remove_node_status_report(
        &self,
        callback: &RemoveNodeFromNetworkCallback,
    ) -> Result<bool> {
        match callback.status {
            RemoveNodeStatus::Ready => {
                let signal = self.storage_mut().begin_exclusion_signal.take();
                self.controller_log()
                    .info(|| "the controller is now ready to remove nodes");
                if let Some(signal) = signal {
                    let _ = signal.send(Ok(true));
                }
                self.emit(ControllerEvent::ExclusionStarted);
            }

            RemoveNodeStatus::Failed => {
                let begin_signal = self.storage_mut().begin_exclusion_signal.take();
                match begin_signal {
                    Some(signal) => {
                        let _ = signal.send(Err(ControllerError::ExclusionFailed));
                        self.stop_exclusion_internal().await;
                    }
                    None => {
                        self.controller_log().warn(|| "removing the node failed");
                        self.emit(ControllerEvent::ExclusionFailed);
                        self.stop_exclusion_internal().await;
                    }
                }
                let mut storage = self.storage_mut();
                storage.exclusion_active = false;
                storage.pending_node = PendingNode::Idle;
            }

            RemoveNodeStatus::RemovingSlave | RemoveNodeStatus::RemovingController => {
                if let Some(node_id) = callback.node_id {
                    self.storage_mut().pending_node = PendingNode::Exclusion { node_id };
                }
            }

            RemoveNodeStatus::Done => {
                let (stop_signal, pending) = {
                    let mut storage = self.storage_mut();
                    let stop_signal = storage.stop_exclusion_signal.take();
                    let pending = std::mem::take(&mut storage.pending_node);
                    storage.exclusion_active = false;
                    (stop_signal, pending)
                };
                if let Some(signal) = stop_signal {
                    let _ = signal.send(true);
                }
                self.emit(ControllerEvent::ExclusionStopped);

                match pending {
                    PendingNode::Exclusion { node_id } => {
                        self.controller_log()
                            .info(|| format!("node {} was removed from the network", node_id));
                        // Publish while the registry entry still resolves
                        self.emit(ControllerEvent::NodeRemoved {
                            node_id,
                            replaced: false,
                        });
                        self.forget_node(node_id);
                    }
                    PendingNode::Idle => {}
                    other => {
                        self.storage_mut().pending_node = other;
                    }
                }
            }

            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Drops a node from the registry along with its stored values
    pub(crate) fn forget_node(&self, node_id: zwnet_core::definitions::NodeId) {
        self.node_storage_mut().remove(&node_id);
        self.value_db_mut().remove_all_of_node(node_id);
        self.metadata_db_mut().remove_all_of_node(node_id);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{drain_events, settle, test_controller_with_nodes};
    use zwnet_core::definitions::NodeId;

    fn remove_node_callback(status: RemoveNodeStatus) -> RemoveNodeFromNetworkCallback {
        RemoveNodeFromNetworkCallback::builder().status(status).build()
    }

    #[tokio::test]
    async fn test_exclusion_happy_path() {
        let fixture = test_controller_with_nodes(&[5]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        let begin = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.begin_exclusion().await })
        };
        settle().await;

        controller
            .handle_serial_callback(remove_node_callback(RemoveNodeStatus::Ready).into())
            .await
            .unwrap();
        assert!(begin.await.unwrap().unwrap());
        assert!(controller.exclusion_active());

        let removing = RemoveNodeFromNetworkCallback::builder()
            .status(RemoveNodeStatus::RemovingSlave)
            .node_id(NodeId::new(5))
            .build();
        controller.handle_serial_callback(removing.into()).await.unwrap();
        controller
            .handle_serial_callback(remove_node_callback(RemoveNodeStatus::Done).into())
            .await
            .unwrap();

        assert!(controller.get_node(&NodeId::new(5)).is_none());
        assert!(!controller.exclusion_active());

        let events = drain_events(&mut events);
        assert_eq!(
            events,
            vec![
                ControllerEvent::ExclusionStarted,
                ControllerEvent::ExclusionStopped,
                ControllerEvent::NodeRemoved {
                    node_id: NodeId::new(5),
                    replaced: false
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_exclusion_failed_before_ready() {
        let fixture = test_controller_with_nodes(&[]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        let begin = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.begin_exclusion().await })
        };
        settle().await;
        controller
            .handle_serial_callback(remove_node_callback(RemoveNodeStatus::Failed).into())
            .await
            .unwrap();

        let result = begin.await.unwrap();
        assert!(matches!(result, Err(ControllerError::ExclusionFailed)));
        assert!(!controller.exclusion_active());
        assert!(drain_events(&mut events).is_empty());
    }

    #[tokio::test]
    async fn test_stop_exclusion_is_idempotent() {
        let fixture = test_controller_with_nodes(&[]).await;
        let controller = fixture.controller.clone();
        let mut events = controller.subscribe();

        assert!(!controller.stop_exclusion().await.unwrap());
        assert!(drain_events(&mut events).is_empty());
    }
}
