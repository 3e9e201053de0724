use super::LIFELINE_GROUP;
use crate::error::{ControllerError, Result};
use crate::node::McDestinations;
use crate::{AssociationConfig, Controller, Node, Ready};
use std::collections::{BTreeMap, BTreeSet};
use zwnet_cc::commandclass::{
    AssociationAddress, AssociationCCGet, AssociationCCRemove, AssociationCCSet,
    AssociationCCSupportedGroupingsGet, AssociationGroupInfoCCCommandListGet,
    AssociationGroupInfoCCInfoGet, AssociationGroupInfoCCNameGet, AssociationGroupProfile, CC,
    CCAddressable, EndpointDestination, MultiChannelAssociationCCGet,
    MultiChannelAssociationCCRemove, MultiChannelAssociationCCSet,
    MultiChannelAssociationCCSupportedGroupingsGet, WithAddress,
};
use zwnet_core::prelude::*;

/// The read model of one association group, merged from the AGI cache and
/// the device configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationGroup {
    pub max_nodes: u8,
    pub is_lifeline: bool,
    pub multi_channel: bool,
    pub label: String,
    pub profile: Option<AssociationGroupProfile>,
    pub issued_commands: Option<BTreeSet<CommandClasses>>,
}

impl Controller<Ready> {
    /// Returns the metadata of all association groups of a node
    pub fn get_association_groups(&self, node_id: NodeId) -> Result<BTreeMap<u8, AssociationGroup>> {
        let node = self.get_node_or_err(&node_id)?;
        if !node.supports_cc(CommandClasses::Association) {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::Association,
            });
        }
        let has_agi = node.supports_cc(CommandClasses::AssociationGroupInformation);
        let supports_mc = node.supports_cc(CommandClasses::MultiChannelAssociation);
        let is_zwave_plus = node.is_zwave_plus();

        let (plain_count, mc_count, max_nodes, mc_max_nodes, agi_names, agi_profiles, agi_issued) = {
            let nodes = self.node_storage();
            let storage = nodes
                .get(&node_id)
                .ok_or(ControllerError::NodeNotFound(node_id))?;
            let associations = &storage.associations;
            (
                associations.group_count.unwrap_or(0),
                if supports_mc {
                    associations.mc_group_count.unwrap_or(0)
                } else {
                    0
                },
                associations.max_nodes.clone(),
                associations.mc_max_nodes.clone(),
                associations.agi.names.clone(),
                associations.agi.profiles.clone(),
                associations.agi.issued_commands.clone(),
            )
        };
        let group_count = plain_count.max(mc_count);

        let mut groups = BTreeMap::new();
        for group_id in 1..=group_count {
            let config = self.association_config(&node, group_id);
            let multi_channel = supports_mc && group_id <= mc_count;

            let max_nodes = if multi_channel {
                mc_max_nodes.get(&group_id).copied()
            } else {
                None
            }
            .or_else(|| max_nodes.get(&group_id).copied())
            .or_else(|| config.as_ref().map(|c| c.max_nodes))
            .unwrap_or(1);

            let is_lifeline = (is_zwave_plus && group_id == LIFELINE_GROUP)
                || (has_agi && group_id == LIFELINE_GROUP)
                || config
                    .as_ref()
                    .map(|c| c.is_lifeline)
                    .unwrap_or(group_id == LIFELINE_GROUP);

            let label = config
                .as_ref()
                .map(|c| c.label.clone())
                .or_else(|| agi_names.get(&group_id).cloned())
                .unwrap_or_else(|| format!("Unnamed group {}", group_id));

            let (profile, issued_commands) = if has_agi {
                (
                    agi_profiles.get(&group_id).copied(),
                    agi_issued.get(&group_id).cloned(),
                )
            } else {
                (None, None)
            };

            groups.insert(
                group_id,
                AssociationGroup {
                    max_nodes,
                    is_lifeline,
                    multi_channel,
                    label,
                    profile,
                    issued_commands,
                },
            );
        }
        Ok(groups)
    }

    /// Returns the cached association destinations of all groups of a node.
    /// Plain and multi-channel destinations are merged; a destination that
    /// appears in both caches with the same `(node, endpoint)` pair is
    /// returned once.
    pub fn get_associations(
        &self,
        node_id: NodeId,
    ) -> Result<BTreeMap<u8, Vec<AssociationAddress>>> {
        let node = self.get_node_or_err(&node_id)?;
        if !node.supports_cc(CommandClasses::Association) {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::Association,
            });
        }
        let supports_mc = node.supports_cc(CommandClasses::MultiChannelAssociation);

        let mut merged: BTreeMap<u8, BTreeSet<AssociationAddress>> = BTreeMap::new();
        {
            let nodes = self.node_storage();
            let storage = nodes
                .get(&node_id)
                .ok_or(ControllerError::NodeNotFound(node_id))?;
            let associations = &storage.associations;

            for (group_id, destinations) in &associations.destinations {
                let group = merged.entry(*group_id).or_default();
                group.extend(destinations.iter().map(|id| AssociationAddress::new(*id)));
            }
            if supports_mc {
                for (group_id, destinations) in &associations.mc_destinations {
                    let group = merged.entry(*group_id).or_default();
                    group.extend(
                        destinations
                            .node_ids
                            .iter()
                            .map(|id| AssociationAddress::new(*id)),
                    );
                    group.extend(
                        destinations
                            .endpoints
                            .iter()
                            .map(|e| AssociationAddress::from(*e)),
                    );
                }
            }
        }

        Ok(merged
            .into_iter()
            .map(|(group_id, destinations)| (group_id, destinations.into_iter().collect()))
            .collect())
    }

    /// Checks whether the given association may be created without breaking
    /// the target. Fails when the node or the target endpoint do not exist.
    pub fn is_association_allowed(
        &self,
        node_id: NodeId,
        group_id: u8,
        target: &AssociationAddress,
    ) -> Result<bool> {
        let node = self.get_node_or_err(&node_id)?;
        let own_node_id = self.own_node_id();

        if !node.supports_cc(CommandClasses::Association)
            && !node.supports_cc(CommandClasses::MultiChannelAssociation)
        {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::Association,
            });
        }

        // The target endpoint must exist. We are always a valid target ourselves.
        let target_endpoint = if target.node_id == own_node_id {
            self.get_node(&own_node_id).and_then(|n| n.get_endpoint(0))
        } else {
            let target_node = self.get_node_or_err(&target.node_id)?;
            let endpoint_index = target.endpoint.unwrap_or(0);
            Some(target_node.get_endpoint(endpoint_index).ok_or(
                ControllerError::EndpointNotFound {
                    node_id: target.node_id,
                    endpoint: endpoint_index,
                },
            )?)
        };

        // Lifeline reports to us are what associations are for
        if target.node_id == own_node_id && self.group_is_lifeline(&node, group_id) {
            return Ok(true);
        }

        // Without AGI there is no information to enforce
        if !node.supports_cc(CommandClasses::AssociationGroupInformation) {
            return Ok(true);
        }
        let issued = {
            let nodes = self.node_storage();
            nodes
                .get(&node_id)
                .and_then(|storage| storage.associations.agi.issued_commands.get(&group_id))
                .cloned()
        };
        let Some(issued) = issued.filter(|commands| !commands.is_empty()) else {
            return Ok(true);
        };

        let Some(endpoint) = target_endpoint else {
            return Ok(true);
        };

        // Basic is special: anything with an actuator function will accept it
        if issued.contains(&CommandClasses::Basic) && endpoint.supports_any_actuator_cc() {
            return Ok(true);
        }
        Ok(issued.iter().any(|cc| endpoint.supports_cc(*cc)))
    }

    /// Adds the given destinations to an association group after checking
    /// that each of them is admissible
    pub async fn add_associations(
        &self,
        node_id: NodeId,
        group_id: u8,
        associations: &[AssociationAddress],
    ) -> Result<()> {
        let node = self.get_node_or_err(&node_id)?;
        let supports_mc = node.supports_cc(CommandClasses::MultiChannelAssociation);
        let supports_plain = node.supports_cc(CommandClasses::Association);
        if !supports_mc && !supports_plain {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::Association,
            });
        }

        let (plain_targets, endpoint_targets) = split_destinations(associations);
        if !endpoint_targets.is_empty() && !supports_mc {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::MultiChannelAssociation,
            });
        }

        let (plain_count, mc_count) = self.cached_group_counts(node_id, supports_mc);
        let group_count = plain_count.max(mc_count);
        if group_id > group_count {
            return Err(ControllerError::InvalidGroup { node_id, group_id });
        }

        let config_pins_no_endpoint = self
            .association_config(&node, group_id)
            .map(|config| !config.multi_channel)
            .unwrap_or(false);
        let group_is_multi_channel =
            supports_mc && group_id <= mc_count && !config_pins_no_endpoint;
        if !group_is_multi_channel && !endpoint_targets.is_empty() {
            return Err(ControllerError::NotAllowed(format!(
                "group {} does not accept endpoint associations",
                group_id
            )));
        }

        let mut disallowed = Vec::new();
        for association in associations {
            if !self.is_association_allowed(node_id, group_id, association)? {
                disallowed.push(association.to_string());
            }
        }
        if !disallowed.is_empty() {
            return Err(ControllerError::NotAllowed(format!(
                "the following associations are not allowed: {}",
                disallowed.join(", ")
            )));
        }

        let cc: WithAddress<CC> = if group_is_multi_channel {
            CC::from(
                MultiChannelAssociationCCSet::builder()
                    .group_id(group_id)
                    .node_ids(plain_targets)
                    .endpoints(endpoint_targets)
                    .build(),
            )
            .with_destination(node_id.into())
        } else {
            CC::from(
                AssociationCCSet::builder()
                    .group_id(group_id)
                    .node_ids(plain_targets)
                    .build(),
            )
            .with_destination(node_id.into())
        };
        self.exec_node_command(&cc, None).await?;

        // Read back what the node actually stored
        self.refresh_association_group(node_id, group_id, group_is_multi_channel)
            .await
    }

    /// Removes the given destinations from an association group. The
    /// multi-channel CC is preferred; the plain CC cleans up whatever the
    /// group additionally holds there.
    pub async fn remove_associations(
        &self,
        node_id: NodeId,
        group_id: u8,
        associations: &[AssociationAddress],
    ) -> Result<()> {
        let node = self.get_node_or_err(&node_id)?;
        let supports_mc = node.supports_cc(CommandClasses::MultiChannelAssociation);
        let supports_plain = node.supports_cc(CommandClasses::Association);
        if !supports_mc && !supports_plain {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::Association,
            });
        }

        let (plain_targets, endpoint_targets) = split_destinations(associations);
        if !endpoint_targets.is_empty() && !supports_mc {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::MultiChannelAssociation,
            });
        }

        let (plain_count, mc_count) = self.cached_group_counts(node_id, supports_mc);
        let group_exists_mc = supports_mc && group_id <= mc_count;
        let group_exists_plain = group_id <= plain_count;
        if !group_exists_mc && !group_exists_plain {
            return Err(ControllerError::InvalidGroup { node_id, group_id });
        }

        if group_exists_mc {
            let cc: WithAddress<CC> = CC::from(
                MultiChannelAssociationCCRemove::builder()
                    .group_id(group_id)
                    .node_ids(plain_targets.clone())
                    .endpoints(endpoint_targets)
                    .build(),
            )
            .with_destination(node_id.into());
            self.exec_node_command(&cc, None).await?;

            // The same group may exist in the plain CC and still hold these
            // destinations. Do not touch it when it only exists as multi-channel.
            if group_exists_plain && !plain_targets.is_empty() {
                let cc: WithAddress<CC> = CC::from(
                    AssociationCCRemove::builder()
                        .group_id(group_id)
                        .node_ids(plain_targets)
                        .build(),
                )
                .with_destination(node_id.into());
                self.exec_node_command(&cc, None).await?;
            }
        } else {
            if !endpoint_targets.is_empty() {
                return Err(ControllerError::NotAllowed(format!(
                    "group {} does not hold endpoint associations",
                    group_id
                )));
            }
            let cc: WithAddress<CC> = CC::from(
                AssociationCCRemove::builder()
                    .group_id(group_id)
                    .node_ids(plain_targets)
                    .build(),
            )
            .with_destination(node_id.into());
            self.exec_node_command(&cc, None).await?;
        }

        if group_exists_mc {
            self.refresh_association_group(node_id, group_id, true).await?;
        }
        if group_exists_plain {
            self.refresh_association_group(node_id, group_id, false)
                .await?;
        }
        Ok(())
    }

    /// Removes a node from the association tables of every other node in the
    /// network, e.g. after it left the network. Nodes without association
    /// support are skipped.
    pub async fn remove_node_from_all_associations(&self, removed_node_id: NodeId) -> Result<()> {
        let own_node_id = self.own_node_id();
        let node_ids: Vec<NodeId> = self
            .node_ids()
            .into_iter()
            .filter(|id| *id != own_node_id && *id != removed_node_id)
            .collect();

        let tasks = node_ids.into_iter().map(|node_id| {
            let controller = self.clone();
            async move {
                controller
                    .remove_node_from_associations_of(node_id, removed_node_id)
                    .await;
            }
        });
        futures::future::join_all(tasks).await;
        Ok(())
    }

    async fn remove_node_from_associations_of(&self, node_id: NodeId, removed_node_id: NodeId) {
        let Some(node) = self.get_node(&node_id) else {
            return;
        };

        let cc: WithAddress<CC> = if node.supports_cc(CommandClasses::MultiChannelAssociation) {
            // Also clears any endpoint destinations of the removed node
            let endpoints: Vec<EndpointDestination> = {
                let nodes = self.node_storage();
                let mut endpoints: BTreeSet<EndpointDestination> = BTreeSet::new();
                if let Some(storage) = nodes.get(&node_id) {
                    for destinations in storage.associations.mc_destinations.values() {
                        endpoints.extend(
                            destinations
                                .endpoints
                                .iter()
                                .filter(|e| e.node_id == removed_node_id),
                        );
                    }
                }
                endpoints.into_iter().collect()
            };
            CC::from(
                MultiChannelAssociationCCRemove::builder()
                    .node_ids(vec![removed_node_id])
                    .endpoints(endpoints)
                    .build(),
            )
            .with_destination(node_id.into())
        } else if node.supports_cc(CommandClasses::Association) {
            CC::from(
                AssociationCCRemove::builder()
                    .node_ids(vec![removed_node_id])
                    .build(),
            )
            .with_destination(node_id.into())
        } else {
            return;
        };

        if let Err(e) = self.exec_node_command(&cc, None).await {
            self.node_log(node_id, EndpointIndex::Root).warn(|| {
                format!(
                    "failed to remove node {} from the associations: {}",
                    removed_node_id,
                    e.categorize()
                )
            });
        }

        let mut nodes = self.node_storage_mut();
        if let Some(storage) = nodes.get_mut(&node_id) {
            let associations = &mut storage.associations;
            for destinations in associations.destinations.values_mut() {
                destinations.retain(|id| *id != removed_node_id);
            }
            for destinations in associations.mc_destinations.values_mut() {
                destinations.node_ids.retain(|id| *id != removed_node_id);
                destinations
                    .endpoints
                    .retain(|e| e.node_id != removed_node_id);
            }
        }
    }

    /// Queries how many association groups the node advertises, for the plain
    /// and (if supported) the multi-channel variant, and caches the counts
    pub async fn refresh_association_group_counts(&self, node_id: NodeId) -> Result<()> {
        let node = self.get_node_or_err(&node_id)?;
        if !node.supports_cc(CommandClasses::Association) {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::Association,
            });
        }

        let cc: WithAddress<CC> = CC::from(AssociationCCSupportedGroupingsGet::default())
            .with_destination(node_id.into());
        let response = self.exec_node_command(&cc, None).await?;
        if let Some(CC::AssociationCCSupportedGroupingsReport(report)) = response {
            let mut nodes = self.node_storage_mut();
            if let Some(storage) = nodes.get_mut(&node_id) {
                storage.associations.group_count = Some(report.groups_count);
            }
        }

        if node.supports_cc(CommandClasses::MultiChannelAssociation) {
            let cc: WithAddress<CC> =
                CC::from(MultiChannelAssociationCCSupportedGroupingsGet::default())
                    .with_destination(node_id.into());
            let response = self.exec_node_command(&cc, None).await?;
            if let Some(CC::MultiChannelAssociationCCSupportedGroupingsReport(report)) = response {
                let mut nodes = self.node_storage_mut();
                if let Some(storage) = nodes.get_mut(&node_id) {
                    storage.associations.mc_group_count = Some(report.groups_count);
                }
            }
        }
        Ok(())
    }

    /// Queries the AGI name, profile and issued-command list of one group
    /// into the cache
    pub async fn refresh_association_group_info(
        &self,
        node_id: NodeId,
        group_id: u8,
    ) -> Result<()> {
        let node = self.get_node_or_err(&node_id)?;
        if !node.supports_cc(CommandClasses::AssociationGroupInformation) {
            return Err(ControllerError::CCNotSupported {
                node_id,
                cc: CommandClasses::AssociationGroupInformation,
            });
        }

        let cc: WithAddress<CC> =
            CC::from(AssociationGroupInfoCCNameGet { group_id }).with_destination(node_id.into());
        let response = self.exec_node_command(&cc, None).await?;
        if let Some(CC::AssociationGroupInfoCCNameReport(report)) = response {
            let mut nodes = self.node_storage_mut();
            if let Some(storage) = nodes.get_mut(&node_id) {
                storage.associations.agi.names.insert(group_id, report.name);
            }
        }

        let cc: WithAddress<CC> =
            CC::from(AssociationGroupInfoCCInfoGet { group_id }).with_destination(node_id.into());
        let response = self.exec_node_command(&cc, None).await?;
        if let Some(CC::AssociationGroupInfoCCInfoReport(report)) = response {
            let mut nodes = self.node_storage_mut();
            if let Some(storage) = nodes.get_mut(&node_id) {
                storage
                    .associations
                    .agi
                    .profiles
                    .insert(group_id, report.profile);
            }
        }

        let cc: WithAddress<CC> = CC::from(AssociationGroupInfoCCCommandListGet { group_id })
            .with_destination(node_id.into());
        let response = self.exec_node_command(&cc, None).await?;
        if let Some(CC::AssociationGroupInfoCCCommandListReport(report)) = response {
            let mut nodes = self.node_storage_mut();
            if let Some(storage) = nodes.get_mut(&node_id) {
                storage
                    .associations
                    .agi
                    .issued_commands
                    .insert(group_id, report.commands.into_iter().collect());
            }
        }
        Ok(())
    }

    /// Re-reads one association group from the node into the cache
    pub(crate) async fn refresh_association_group(
        &self,
        node_id: NodeId,
        group_id: u8,
        multi_channel: bool,
    ) -> Result<()> {
        if multi_channel {
            let cc: WithAddress<CC> = CC::from(MultiChannelAssociationCCGet { group_id })
                .with_destination(node_id.into());
            let response = self.exec_node_command(&cc, None).await?;
            if let Some(CC::MultiChannelAssociationCCReport(report)) = response {
                let mut nodes = self.node_storage_mut();
                if let Some(storage) = nodes.get_mut(&node_id) {
                    let associations = &mut storage.associations;
                    associations.mc_max_nodes.insert(group_id, report.max_nodes);
                    associations.mc_destinations.insert(
                        group_id,
                        McDestinations {
                            node_ids: report.node_ids,
                            endpoints: report.endpoints,
                        },
                    );
                }
            }
        } else {
            let cc: WithAddress<CC> =
                CC::from(AssociationCCGet { group_id }).with_destination(node_id.into());
            let response = self.exec_node_command(&cc, None).await?;
            if let Some(CC::AssociationCCReport(report)) = response {
                let mut nodes = self.node_storage_mut();
                if let Some(storage) = nodes.get_mut(&node_id) {
                    let associations = &mut storage.associations;
                    associations.max_nodes.insert(group_id, report.max_nodes);
                    associations
                        .destinations
                        .insert(group_id, report.node_ids);
                }
            }
        }
        Ok(())
    }

    fn cached_group_counts(&self, node_id: NodeId, supports_mc: bool) -> (u8, u8) {
        let nodes = self.node_storage();
        let Some(storage) = nodes.get(&node_id) else {
            return (0, 0);
        };
        (
            storage.associations.group_count.unwrap_or(0),
            if supports_mc {
                storage.associations.mc_group_count.unwrap_or(0)
            } else {
                0
            },
        )
    }

    fn association_config(&self, node: &Node, group_id: u8) -> Option<AssociationConfig> {
        let fingerprint = node.fingerprint()?;
        self.options()
            .config
            .lookup_device(&fingerprint)
            .and_then(|config| config.association(group_id))
            .cloned()
    }

    fn group_is_lifeline(&self, node: &Node, group_id: u8) -> bool {
        if node.supports_cc(CommandClasses::AssociationGroupInformation)
            && group_id == LIFELINE_GROUP
        {
            return true;
        }
        self.association_config(node, group_id)
            .map(|config| config.is_lifeline)
            .unwrap_or(group_id == LIFELINE_GROUP)
    }
}

fn split_destinations(
    associations: &[AssociationAddress],
) -> (Vec<NodeId>, Vec<EndpointDestination>) {
    let plain = associations
        .iter()
        .filter(|a| a.endpoint.is_none())
        .map(|a| a.node_id)
        .collect();
    let endpoints = associations
        .iter()
        .filter_map(|a| a.endpoint.map(|ep| EndpointDestination::new(a.node_id, ep)))
        .collect();
    (plain, endpoints)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::node::NodeStorage;
    use crate::test_utils::{
        OWN_NODE_ID, fixture_with_nodes, fixture_with_options, node_with_ccs,
    };
    use crate::{ConfigManager, DeviceConfig};
    use std::collections::BTreeMap;
    use zwnet_serial::command::Command;

    fn network(nodes: Vec<(u8, NodeStorage)>) -> BTreeMap<NodeId, NodeStorage> {
        let mut map = BTreeMap::new();
        map.insert(OWN_NODE_ID, node_with_ccs(&[]));
        for (id, storage) in nodes {
            map.insert(NodeId::new(id), storage);
        }
        map
    }

    fn association_node(group_count: u8) -> NodeStorage {
        let mut storage = node_with_ccs(&[CommandClasses::Association]);
        storage.associations.group_count = Some(group_count);
        storage
    }

    #[tokio::test]
    async fn test_association_round_trip() {
        let fixture = fixture_with_nodes(network(vec![
            (3, association_node(2)),
            (5, node_with_ccs(&[CommandClasses::BinarySwitch])),
        ]))
        .await;
        let controller = &fixture.controller;

        let destination = AssociationAddress::new(NodeId::new(5));
        controller
            .add_associations(NodeId::new(3), 2, &[destination])
            .await
            .unwrap();

        let associations = controller.get_associations(NodeId::new(3)).unwrap();
        assert_eq!(associations.get(&2), Some(&vec![destination]));
    }

    #[tokio::test]
    async fn test_associations_deduplicate_identical_destinations() {
        let mut node = node_with_ccs(&[
            CommandClasses::Association,
            CommandClasses::MultiChannelAssociation,
        ]);
        node.associations.group_count = Some(1);
        node.associations.mc_group_count = Some(1);
        node.associations.destinations.insert(1, vec![NodeId::new(5)]);
        node.associations.mc_destinations.insert(
            1,
            McDestinations {
                node_ids: vec![NodeId::new(5)],
                endpoints: vec![EndpointDestination::new(NodeId::new(5), 1)],
            },
        );

        let fixture = fixture_with_nodes(network(vec![(3, node)])).await;
        let associations = fixture.controller.get_associations(NodeId::new(3)).unwrap();

        // The plain destination appears in both caches but only once here
        assert_eq!(
            associations.get(&1),
            Some(&vec![
                AssociationAddress::new(NodeId::new(5)),
                AssociationAddress::with_endpoint(NodeId::new(5), 1),
            ])
        );
    }

    #[tokio::test]
    async fn test_add_associations_rejects_disallowed_targets() {
        let mut node = node_with_ccs(&[
            CommandClasses::Association,
            CommandClasses::MultiChannelAssociation,
            CommandClasses::AssociationGroupInformation,
        ]);
        node.associations.group_count = Some(2);
        node.associations.mc_group_count = Some(2);
        node.associations
            .agi
            .issued_commands
            .insert(2, [CommandClasses::MultilevelSwitch].into_iter().collect());

        let fixture = fixture_with_nodes(network(vec![
            (3, node),
            (5, node_with_ccs(&[CommandClasses::BinarySwitch])),
        ]))
        .await;

        let result = fixture
            .controller
            .add_associations(
                NodeId::new(3),
                2,
                &[AssociationAddress::with_endpoint(NodeId::new(5), 0)],
            )
            .await;
        match result {
            Err(ControllerError::NotAllowed(message)) => {
                assert!(message.contains("005"));
            }
            other => panic!("expected NotAllowed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_lifeline_association_to_controller_is_always_allowed() {
        let mut node = node_with_ccs(&[
            CommandClasses::Association,
            CommandClasses::AssociationGroupInformation,
        ]);
        node.associations.group_count = Some(1);
        node.associations
            .agi
            .issued_commands
            .insert(1, [CommandClasses::MultilevelSwitch].into_iter().collect());

        let fixture = fixture_with_nodes(network(vec![(3, node)])).await;
        let allowed = fixture
            .controller
            .is_association_allowed(NodeId::new(3), 1, &AssociationAddress::new(OWN_NODE_ID))
            .unwrap();
        assert!(allowed);
    }

    #[tokio::test]
    async fn test_association_target_endpoint_must_exist() {
        let fixture = fixture_with_nodes(network(vec![
            (3, association_node(2)),
            (5, node_with_ccs(&[])),
        ]))
        .await;

        let result = fixture.controller.is_association_allowed(
            NodeId::new(3),
            1,
            &AssociationAddress::with_endpoint(NodeId::new(5), 3),
        );
        assert!(matches!(
            result,
            Err(ControllerError::EndpointNotFound {
                endpoint: 3,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_add_associations_rejects_out_of_range_group() {
        let fixture = fixture_with_nodes(network(vec![
            (3, association_node(2)),
            (5, node_with_ccs(&[])),
        ]))
        .await;

        let result = fixture
            .controller
            .add_associations(NodeId::new(3), 4, &[AssociationAddress::new(NodeId::new(5))])
            .await;
        assert!(matches!(
            result,
            Err(ControllerError::InvalidGroup { group_id: 4, .. })
        ));
    }

    #[tokio::test]
    async fn test_remove_from_multi_channel_only_group_skips_plain_fallback() {
        let mut node = node_with_ccs(&[
            CommandClasses::Association,
            CommandClasses::MultiChannelAssociation,
        ]);
        node.associations.group_count = Some(2);
        node.associations.mc_group_count = Some(3);
        node.associations.mc_destinations.insert(
            3,
            McDestinations {
                node_ids: vec![NodeId::new(5)],
                endpoints: vec![],
            },
        );

        let fixture = fixture_with_nodes(network(vec![(3, node), (5, node_with_ccs(&[]))])).await;
        fixture
            .controller
            .remove_associations(NodeId::new(3), 3, &[AssociationAddress::new(NodeId::new(5))])
            .await
            .unwrap();

        // Group 3 only exists as multi-channel, so no plain remove was sent
        let sent = fixture.mock.sent.lock().unwrap();
        let removes: Vec<_> = sent
            .iter()
            .filter_map(|command| match command {
                Command::SendDataRequest(request) => Some(&request.command),
                _ => None,
            })
            .collect();
        assert!(
            removes
                .iter()
                .any(|cc| matches!(cc, CC::MultiChannelAssociationCCRemove(_)))
        );
        assert!(
            !removes
                .iter()
                .any(|cc| matches!(cc, CC::AssociationCCRemove(_)))
        );
    }

    #[tokio::test]
    async fn test_remove_node_from_all_associations() {
        let mut plain_node = association_node(1);
        plain_node
            .associations
            .destinations
            .insert(1, vec![NodeId::new(5)]);

        let mut mc_node = node_with_ccs(&[
            CommandClasses::Association,
            CommandClasses::MultiChannelAssociation,
        ]);
        mc_node.associations.mc_group_count = Some(1);
        mc_node.associations.mc_destinations.insert(
            1,
            McDestinations {
                node_ids: vec![NodeId::new(5)],
                endpoints: vec![EndpointDestination::new(NodeId::new(5), 2)],
            },
        );

        let fixture = fixture_with_nodes(network(vec![
            (2, plain_node),
            (3, mc_node),
            (5, node_with_ccs(&[])),
            // No association support at all: skipped silently
            (6, node_with_ccs(&[CommandClasses::BinarySwitch])),
        ]))
        .await;
        let controller = &fixture.controller;

        controller
            .remove_node_from_all_associations(NodeId::new(5))
            .await
            .unwrap();

        // The caches no longer mention node 5
        let nodes = controller.node_storage();
        let plain = &nodes.get(&NodeId::new(2)).unwrap().associations;
        assert!(plain.destinations[&1].is_empty());
        let mc = &nodes.get(&NodeId::new(3)).unwrap().associations;
        assert!(mc.mc_destinations[&1].node_ids.is_empty());
        assert!(mc.mc_destinations[&1].endpoints.is_empty());
        drop(nodes);

        // Node 6 was never addressed
        let sent = fixture.mock.sent.lock().unwrap();
        assert!(!sent.iter().any(|command| matches!(
            command,
            Command::SendDataRequest(request) if request.node_id == NodeId::new(6)
        )));
    }

    #[tokio::test]
    async fn test_association_groups_merge_config_and_agi() {
        let fingerprint = DeviceFingerprint::new(0x0086, 0x0003, 0x0009);
        let mut node = node_with_ccs(&[
            CommandClasses::Association,
            CommandClasses::AssociationGroupInformation,
            CommandClasses::ZWavePlusInfo,
        ]);
        node.fingerprint = Some(fingerprint);
        node.associations.group_count = Some(2);
        node.associations.max_nodes.insert(2, 3);
        node.associations.agi.names.insert(2, "Dimming".to_string());
        node.associations
            .agi
            .profiles
            .insert(1, AssociationGroupProfile::GeneralLifeline);

        let mut config = ConfigManager::default();
        let mut device = DeviceConfig::default();
        device.associations.insert(
            1,
            crate::AssociationConfig::builder()
                .label("Lifeline")
                .max_nodes(5)
                .is_lifeline(true)
                .build(),
        );
        config.add_device(fingerprint, device);
        let options = crate::ControllerOptions::builder().config(config).build();

        let fixture = fixture_with_options(network(vec![(7, node)]), options).await;
        let groups = fixture
            .controller
            .get_association_groups(NodeId::new(7))
            .unwrap();

        let lifeline = &groups[&1];
        assert!(lifeline.is_lifeline);
        assert_eq!(lifeline.label, "Lifeline");
        assert_eq!(lifeline.max_nodes, 5);
        assert_eq!(
            lifeline.profile,
            Some(AssociationGroupProfile::GeneralLifeline)
        );

        let dimming = &groups[&2];
        assert!(!dimming.is_lifeline);
        // No config for group 2: the AGI name wins
        assert_eq!(dimming.label, "Dimming");
        assert_eq!(dimming.max_nodes, 3);
    }

    #[tokio::test]
    async fn test_refresh_group_counts_and_agi_info() {
        let node = node_with_ccs(&[
            CommandClasses::Association,
            CommandClasses::MultiChannelAssociation,
            CommandClasses::AssociationGroupInformation,
        ]);
        let fixture = fixture_with_nodes(network(vec![(3, node)])).await;
        let controller = &fixture.controller;
        {
            let mut sim = fixture.sim.lock().unwrap();
            sim.supported_groupings.insert(NodeId::new(3), 3);
            sim.mc_supported_groupings.insert(NodeId::new(3), 2);
            sim.agi_names
                .insert((NodeId::new(3), 2), "Dimmer control".to_string());
            sim.agi_profiles.insert(
                (NodeId::new(3), 2),
                AssociationGroupProfile::Other(0x2001),
            );
            sim.agi_commands.insert(
                (NodeId::new(3), 2),
                vec![CommandClasses::MultilevelSwitch],
            );
        }

        controller
            .refresh_association_group_counts(NodeId::new(3))
            .await
            .unwrap();
        controller
            .refresh_association_group_info(NodeId::new(3), 2)
            .await
            .unwrap();

        let groups = controller.get_association_groups(NodeId::new(3)).unwrap();
        assert_eq!(groups.len(), 3);
        let group = &groups[&2];
        assert_eq!(group.label, "Dimmer control");
        assert_eq!(group.profile, Some(AssociationGroupProfile::Other(0x2001)));
        assert_eq!(
            group.issued_commands,
            Some([CommandClasses::MultilevelSwitch].into_iter().collect())
        );
        assert!(group.multi_channel);
        assert!(!groups[&3].multi_channel);
    }

    #[tokio::test]
    async fn test_get_associations_requires_association_support() {
        let fixture =
            fixture_with_nodes(network(vec![(3, node_with_ccs(&[CommandClasses::Basic]))])).await;
        let result = fixture.controller.get_associations(NodeId::new(3));
        assert!(matches!(
            result,
            Err(ControllerError::CCNotSupported { .. })
        ));
    }
}
