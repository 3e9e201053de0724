use crate::error::{ControllerError, Result};
use crate::{Controller, Ready, SendCommandOptions};
use futures::channel::oneshot;
use zwnet_serial::command::HardResetRequest;

impl Controller<Ready> {
    /// Resets the stick to factory defaults. Once the stick confirms, the
    /// entire network is forgotten: all nodes are dropped from the registry
    /// together with their stored values.
    pub async fn hard_reset(&self) -> Result<()> {
        self.controller_log().warn(|| "performing hard reset...");

        let signal_rx = {
            let mut storage = self.storage_mut();
            let (tx, rx) = oneshot::channel();
            storage.hard_reset_signal = Some(tx);
            rx
        };

        if let Err(e) = self
            .exec_controller_command(
                HardResetRequest::default(),
                Some(&SendCommandOptions::controller_priority()),
            )
            .await
        {
            // Unregister the one-shot confirmation handler again
            self.storage_mut().hard_reset_signal = None;
            return Err(e);
        }

        signal_rx.await.map_err(|_| {
            ControllerError::Unexpected("the hard reset confirmation went away".to_string())
        })?;
        self.controller_log().info(|| "hard reset complete");
        Ok(())
    }

    /// One-shot: only consumes the callback while a hard reset is in flight
    pub(crate) fn handle_hard_reset_callback(&self) -> bool {
        let Some(signal) = self.storage_mut().hard_reset_signal.take() else {
            return false;
        };

        self.node_storage_mut().clear();
        self.value_db_mut().clear();
        self.metadata_db_mut().clear();

        let _ = signal.send(());
        true
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::test_controller_with_nodes;
    use zwnet_core::definitions::NodeId;
    use zwnet_serial::command::HardResetCallback;

    #[tokio::test]
    async fn test_hard_reset_empties_the_registry() {
        let fixture = test_controller_with_nodes(&[2, 3]).await;
        let controller = &fixture.controller;

        controller.hard_reset().await.unwrap();

        assert!(controller.node_ids().is_empty());
        assert!(controller.get_node(&NodeId::new(2)).is_none());
    }

    #[tokio::test]
    async fn test_hard_reset_callback_is_one_shot() {
        let fixture = test_controller_with_nodes(&[2]).await;
        let controller = &fixture.controller;

        // Without a hard reset in flight, the callback is not ours
        let handled = controller
            .handle_serial_callback(HardResetCallback::builder().build().into())
            .await
            .unwrap();
        assert!(!handled);
        assert!(!controller.node_ids().is_empty());
    }
}
