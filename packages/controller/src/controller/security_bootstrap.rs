use crate::exec_node_command::{ExecNodeCommandError, ExecNodeCommandOptions};
use crate::{Controller, Node, Ready};
use std::time::Duration;
use zwnet_cc::commandclass::{
    CC, CCAddressable, SecurityCCNetworkKeySet, SecurityCCNonceGet, SecurityCCSchemeGet,
    SecurityCCSchemeInherit, WithAddress,
};
use zwnet_core::prelude::*;

/// Nodes that take longer than this per S0 handshake step are not worth waiting for
const S0_BOOTSTRAP_EXPIRY: Duration = Duration::from_secs(10);

impl Controller<Ready> {
    /// Performs the S0 key exchange with a freshly included node. Failure
    /// downgrades the node to insecure communication but never fails the
    /// surrounding inclusion.
    ///
    /// `assume_secure` forces the exchange even when the node has not
    /// advertised Security support, which is the case after replacing a
    /// failed node: that flow never receives a NIF.
    pub(crate) async fn secure_bootstrap_s0(&self, node: &Node, assume_secure: bool) {
        let Some(security_manager) = self.security_manager() else {
            node.set_is_secure(false);
            return;
        };

        if !node.supports_cc(CommandClasses::Security) {
            if assume_secure {
                node.add_cc(CommandClasses::Security, 1);
            } else {
                node.set_is_secure(false);
                return;
            }
        }

        let log = node.logger();
        log.info(|| "beginning S0 bootstrap...");

        match self.run_s0_key_exchange(node, &security_manager).await {
            Ok(()) => {
                node.set_is_secure(true);
                log.info(|| "S0 bootstrap successful");
            }
            Err(e) => {
                node.set_is_secure(false);
                node.remove_cc(CommandClasses::Security);
                log.warn(|| {
                    format!(
                        "S0 bootstrap failed, continuing without security: {}",
                        e.categorize()
                    )
                });
            }
        }
    }

    async fn run_s0_key_exchange(
        &self,
        node: &Node,
        security_manager: &SecurityManager,
    ) -> Result<(), ExecNodeCommandError> {
        let options = ExecNodeCommandOptions::builder()
            .expire(S0_BOOTSTRAP_EXPIRY)
            .build();

        // The scheme report only tells us which schemes exist besides S0,
        // and S0 is the only one we speak
        let cc: WithAddress<CC> =
            CC::from(SecurityCCSchemeGet::default()).with_destination(node.id().into());
        self.exec_node_command(&cc, Some(&options)).await?;

        let cc: WithAddress<CC> =
            CC::from(SecurityCCNonceGet::default()).with_destination(node.id().into());
        let response = self.exec_node_command(&cc, Some(&options)).await?;
        if let Some(CC::SecurityCCNonceReport(report)) = response {
            security_manager.store_free_nonce(node.id(), report.nonce);
        }

        let cc: WithAddress<CC> = CC::from(SecurityCCNetworkKeySet {
            network_key: security_manager.network_key().to_vec(),
        })
        .with_destination(node.id().into());
        self.exec_node_command(&cc, Some(&options)).await?;

        if self.storage().include_controller {
            let cc: WithAddress<CC> =
                CC::from(SecurityCCSchemeInherit::default()).with_destination(node.id().into());
            self.exec_node_command(&cc, Some(&options)).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test_utils::{OWN_NODE_ID, fixture_with_nodes, network_key_manager, node_with_ccs};
    use std::collections::BTreeMap;
    use zwnet_serial::command::Command;

    fn secure_network(node_ccs: &[CommandClasses]) -> BTreeMap<NodeId, crate::node::NodeStorage> {
        let mut nodes = BTreeMap::new();
        nodes.insert(OWN_NODE_ID, node_with_ccs(&[]));
        nodes.insert(NodeId::new(7), node_with_ccs(node_ccs));
        nodes
    }

    #[tokio::test]
    async fn test_s0_bootstrap_marks_node_secure() {
        let fixture = fixture_with_nodes(secure_network(&[CommandClasses::Security])).await;
        let controller = &fixture.controller;
        controller.set_security_manager(network_key_manager());

        let node = controller.get_node(&NodeId::new(7)).unwrap();
        controller.secure_bootstrap_s0(&node, false).await;

        assert!(node.is_secure());
        assert!(node.supports_cc(CommandClasses::Security));
    }

    #[tokio::test]
    async fn test_s0_bootstrap_without_manager_marks_insecure() {
        let fixture = fixture_with_nodes(secure_network(&[CommandClasses::Security])).await;
        let controller = &fixture.controller;

        let node = controller.get_node(&NodeId::new(7)).unwrap();
        controller.secure_bootstrap_s0(&node, false).await;

        assert!(!node.is_secure());
        // Nothing was sent to the node
        assert!(
            fixture
                .mock
                .sent_of_type(FunctionType::SendData)
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_s0_bootstrap_failure_downgrades_the_node() {
        let fixture = fixture_with_nodes(secure_network(&[CommandClasses::Security])).await;
        let controller = &fixture.controller;
        controller.set_security_manager(network_key_manager());
        fixture
            .sim
            .lock()
            .unwrap()
            .unreachable_nodes
            .insert(NodeId::new(7));

        let node = controller.get_node(&NodeId::new(7)).unwrap();
        controller.secure_bootstrap_s0(&node, false).await;

        assert!(!node.is_secure());
        assert!(!node.supports_cc(CommandClasses::Security));
    }

    #[tokio::test]
    async fn test_s0_bootstrap_assume_secure_adds_the_cc() {
        // Replaced nodes never advertise their CCs
        let fixture = fixture_with_nodes(secure_network(&[])).await;
        let controller = &fixture.controller;
        controller.set_security_manager(network_key_manager());

        let node = controller.get_node(&NodeId::new(7)).unwrap();
        controller.secure_bootstrap_s0(&node, true).await;

        assert!(node.is_secure());
        assert!(node.supports_cc(CommandClasses::Security));

        // The key exchange ran in the documented order
        let exchanged: Vec<_> = fixture
            .mock
            .sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|command| match command {
                Command::SendDataRequest(request) => Some(request.command.clone()),
                _ => None,
            })
            .collect();
        assert!(matches!(exchanged[0], CC::SecurityCCSchemeGet(_)));
        assert!(matches!(exchanged[1], CC::SecurityCCNonceGet(_)));
        assert!(matches!(exchanged[2], CC::SecurityCCNetworkKeySet(_)));
    }
}
