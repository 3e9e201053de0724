use crate::InterviewStage;
use crate::error::{ControllerError, Result};
use crate::node::{CommandClassInfo, NodeStorage};
use crate::{Controller, Ready};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use zwnet_core::prelude::*;

/// The persistent shape of the network: one entry per node, keyed by its
/// decimal node ID
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ControllerCache {
    pub nodes: BTreeMap<String, CachedNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedNode {
    pub id: NodeId,
    pub device_class: DeviceClass,
    pub listening: bool,
    pub frequent_listening: bool,
    pub routing: bool,
    pub interview_stage: InterviewStage,
    pub is_secure: bool,
    pub has_suc_return_route: bool,
    pub command_classes: Vec<CachedCommandClass>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCommandClass {
    pub cc: CommandClasses,
    #[serde(flatten)]
    pub info: CommandClassInfo,
}

impl CachedNode {
    fn from_storage(node_id: NodeId, storage: &NodeStorage) -> Self {
        Self {
            id: node_id,
            device_class: storage.protocol_data.device_class,
            listening: storage.protocol_data.listening,
            frequent_listening: storage.protocol_data.frequent_listening,
            routing: storage.protocol_data.routing,
            interview_stage: storage.interview_stage,
            is_secure: storage.is_secure,
            has_suc_return_route: storage.has_suc_return_route,
            command_classes: storage
                .root()
                .cc_info
                .iter()
                .map(|(cc, info)| CachedCommandClass {
                    cc: *cc,
                    info: *info,
                })
                .collect(),
        }
    }

    fn into_storage(self) -> NodeStorage {
        let mut storage = NodeStorage::new(
            NodeInformationProtocolData::builder()
                .device_class(self.device_class)
                .listening(self.listening)
                .frequent_listening(self.frequent_listening)
                .routing(self.routing)
                .build(),
        );
        storage.interview_stage = self.interview_stage;
        storage.is_secure = self.is_secure;
        storage.has_suc_return_route = self.has_suc_return_route;
        {
            let root = storage.root_mut();
            for cached in self.command_classes {
                root.cc_info.insert(cached.cc, cached.info);
            }
        }
        storage
    }
}

impl Controller<Ready> {
    /// Serializes the node registry into the persistent cache format
    pub fn serialize_nodes(&self) -> Result<serde_json::Value> {
        let nodes = self.node_storage();
        let mut cached = BTreeMap::new();
        for (node_id, storage) in nodes.iter() {
            cached.insert(
                u8::from(*node_id).to_string(),
                CachedNode::from_storage(*node_id, storage),
            );
        }
        serde_json::to_value(ControllerCache { nodes: cached })
            .map_err(|e| ControllerError::Unexpected(e.to_string()))
    }

    /// Restores previously serialized node state into the registry. Entries
    /// whose key disagrees with the contained node ID fail the whole restore;
    /// entries for nodes that are no longer part of the network are ignored.
    pub fn restore_nodes(&self, cache: &serde_json::Value) -> Result<()> {
        let cache: ControllerCache = serde_json::from_value(cache.clone())
            .map_err(|e| ControllerError::InvalidCache(e.to_string()))?;

        let mut restored = Vec::new();
        for (key, cached) in cache.nodes {
            let id: u8 = key.parse().map_err(|_| {
                ControllerError::InvalidCache(format!("\"{}\" is not a node ID", key))
            })?;
            if cached.id != NodeId::from(id) {
                return Err(ControllerError::InvalidCache(format!(
                    "node ID mismatch: entry \"{}\" contains node {}",
                    key, cached.id
                )));
            }
            restored.push(cached);
        }

        let mut nodes = self.node_storage_mut();
        for cached in restored {
            let node_id = cached.id;
            let Some(existing) = nodes.get(&node_id) else {
                continue;
            };
            let mut storage = cached.into_storage();
            storage.value_index = existing.value_index.clone();
            nodes.insert(node_id, storage);
        }
        Ok(())
    }
}
