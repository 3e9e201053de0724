use crate::exec_node_command::ExecNodeCommandOptions;
use crate::{Controller, Node, Ready};
use zwnet_cc::commandclass::{
    AssociationCCSet, CC, CCAddressable, EndpointDestination, MultiChannelAssociationCCSet,
    VersionCCCommandClassGet, WakeUpCCIntervalGet, WakeUpCCIntervalSet, WithAddress,
};
use zwnet_core::prelude::*;

/// The association group Z-Wave Plus devices report their state through
pub const LIFELINE_GROUP: u8 = 1;

impl Controller<Ready> {
    /// Makes sure a newly added node reports to us: assigns us as the
    /// lifeline destination and points its wake-up notifications at us
    pub(crate) async fn bootstrap_lifeline_and_wakeup(&self, node: &Node) {
        self.bootstrap_lifeline(node).await;
        if node.supports_cc(CommandClasses::WakeUp) {
            self.bootstrap_wake_up(node).await;
        }
    }

    async fn bootstrap_lifeline(&self, node: &Node) {
        if !node.is_zwave_plus() {
            return;
        }
        let supports_mc = node.supports_cc(CommandClasses::MultiChannelAssociation);
        let supports_plain = node.supports_cc(CommandClasses::Association);
        if !supports_mc && !supports_plain {
            return;
        }

        let log = node.logger();
        log.info(|| "assigning ourselves as the lifeline destination...");

        let own_node_id = self.own_node_id();
        let cc: WithAddress<CC> = if supports_mc {
            // Multi-channel with endpoint 0 makes the node include the source
            // endpoint in its reports
            CC::from(
                MultiChannelAssociationCCSet::builder()
                    .group_id(LIFELINE_GROUP)
                    .endpoints(vec![EndpointDestination::new(own_node_id, 0)])
                    .build(),
            )
            .with_destination(node.id().into())
        } else {
            CC::from(
                AssociationCCSet::builder()
                    .group_id(LIFELINE_GROUP)
                    .node_ids(vec![own_node_id])
                    .build(),
            )
            .with_destination(node.id().into())
        };

        if let Err(e) = self.exec_node_command(&cc, None).await {
            log.warn(|| format!("failed to assign the lifeline: {}", e.categorize()));
            return;
        }

        // Mirror what the node now has stored
        {
            let mut nodes = self.node_storage_mut();
            if let Some(storage) = nodes.get_mut(&node.id()) {
                let associations = &mut storage.associations;
                if supports_mc {
                    let destinations =
                        associations.mc_destinations.entry(LIFELINE_GROUP).or_default();
                    let endpoint = EndpointDestination::new(own_node_id, 0);
                    if !destinations.endpoints.contains(&endpoint) {
                        destinations.endpoints.push(endpoint);
                    }
                } else {
                    let destinations =
                        associations.destinations.entry(LIFELINE_GROUP).or_default();
                    if !destinations.contains(&own_node_id) {
                        destinations.push(own_node_id);
                    }
                }
            }
        }

        // A return route so the lifeline reports actually reach us
        if let Err(e) = self.assign_return_route(node.id(), own_node_id).await {
            log.warn(|| format!("failed to assign the return route: {}", e));
        }
    }

    async fn bootstrap_wake_up(&self, node: &Node) {
        let log = node.logger();
        let options = ExecNodeCommandOptions::default();
        let own_node_id = self.own_node_id();

        let version = {
            let cc: WithAddress<CC> = CC::from(VersionCCCommandClassGet {
                requested_cc: CommandClasses::WakeUp,
            })
            .with_destination(node.id().into());
            match self.exec_node_command(&cc, Some(&options)).await {
                Ok(Some(CC::VersionCCCommandClassReport(report))) => report.version.max(1),
                Ok(_) => 1,
                Err(e) => {
                    log.warn(|| {
                        format!("failed to query the Wake-Up CC version: {}", e.categorize())
                    });
                    1
                }
            }
        };
        node.add_cc(CommandClasses::WakeUp, version);

        // Read the configured interval, then point the wake-ups at us
        let interval_seconds = {
            let cc: WithAddress<CC> =
                CC::from(WakeUpCCIntervalGet::default()).with_destination(node.id().into());
            match self.exec_node_command(&cc, Some(&options)).await {
                Ok(Some(CC::WakeUpCCIntervalReport(report))) => report.interval_seconds,
                Ok(_) => return,
                Err(e) => {
                    log.warn(|| {
                        format!("failed to query the wake-up interval: {}", e.categorize())
                    });
                    return;
                }
            }
        };

        let cc: WithAddress<CC> = CC::from(
            WakeUpCCIntervalSet::builder()
                .interval_seconds(interval_seconds)
                .controller_node_id(own_node_id)
                .build(),
        )
        .with_destination(node.id().into());
        if let Err(e) = self.exec_node_command(&cc, Some(&options)).await {
            log.warn(|| {
                format!(
                    "failed to set the wake-up destination: {}",
                    e.categorize()
                )
            });
            return;
        }

        {
            let mut values = self.value_db_mut();
            values.set(
                node.id(),
                ValueId::new(CommandClasses::WakeUp, "wakeUpInterval"),
                interval_seconds,
            );
            values.set(
                node.id(),
                ValueId::new(CommandClasses::WakeUp, "controllerNodeId"),
                u8::from(own_node_id),
            );
        }
        log.info(|| "wake-up destination configured");
    }
}
