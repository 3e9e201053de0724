use crate::definitions::{CommandClasses, NodeId};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// Identifies a single value on a node: which CC it belongs to, on which
/// endpoint, and the CC-specific property name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId {
    pub command_class: CommandClasses,
    pub endpoint: u8,
    pub property: Cow<'static, str>,
}

impl ValueId {
    pub fn new(command_class: CommandClasses, property: impl Into<Cow<'static, str>>) -> Self {
        Self {
            command_class,
            endpoint: 0,
            property: property.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: u8) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    String(String),
}

impl From<bool> for CacheValue {
    fn from(val: bool) -> Self {
        Self::Bool(val)
    }
}

impl From<u8> for CacheValue {
    fn from(val: u8) -> Self {
        Self::U8(val)
    }
}

impl From<u16> for CacheValue {
    fn from(val: u16) -> Self {
        Self::U16(val)
    }
}

impl From<u32> for CacheValue {
    fn from(val: u32) -> Self {
        Self::U32(val)
    }
}

impl From<String> for CacheValue {
    fn from(val: String) -> Self {
        Self::String(val)
    }
}

/// Describes a value beyond its current state, e.g. for UIs
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueMetadata {
    pub label: Option<String>,
    pub writeable: bool,
}

/// The network-wide current-value database. Keys carry the owning node id so
/// a single store serves all nodes; [index_dbs_by_node] precomputes the
/// per-node key sets that are handed to each node instance.
#[derive(Debug, Default)]
pub struct ValueDB {
    values: BTreeMap<(NodeId, ValueId), CacheValue>,
}

impl ValueDB {
    pub fn get(&self, node_id: NodeId, value_id: &ValueId) -> Option<&CacheValue> {
        self.values.get(&(node_id, value_id.clone()))
    }

    pub fn set(&mut self, node_id: NodeId, value_id: ValueId, value: impl Into<CacheValue>) {
        self.values.insert((node_id, value_id), value.into());
    }

    pub fn remove(&mut self, node_id: NodeId, value_id: &ValueId) -> Option<CacheValue> {
        self.values.remove(&(node_id, value_id.clone()))
    }

    pub fn remove_all_of_node(&mut self, node_id: NodeId) {
        self.values.retain(|(id, _), _| *id != node_id);
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &(NodeId, ValueId)> {
        self.values.keys()
    }
}

/// The network-wide value-metadata database, keyed like [ValueDB]
#[derive(Debug, Default)]
pub struct MetadataDB {
    metadata: BTreeMap<(NodeId, ValueId), ValueMetadata>,
}

impl MetadataDB {
    pub fn get(&self, node_id: NodeId, value_id: &ValueId) -> Option<&ValueMetadata> {
        self.metadata.get(&(node_id, value_id.clone()))
    }

    pub fn set(&mut self, node_id: NodeId, value_id: ValueId, metadata: ValueMetadata) {
        self.metadata.insert((node_id, value_id), metadata);
    }

    pub fn remove_all_of_node(&mut self, node_id: NodeId) {
        self.metadata.retain(|(id, _), _| *id != node_id);
    }

    pub fn clear(&mut self) {
        self.metadata.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &(NodeId, ValueId)> {
        self.metadata.keys()
    }
}

/// Walks both databases once and groups their keys by node, so node
/// instances can be created with their value index without re-scanning
/// the stores per node.
pub fn index_dbs_by_node(
    values: &ValueDB,
    metadata: &MetadataDB,
) -> BTreeMap<NodeId, BTreeSet<ValueId>> {
    let mut index: BTreeMap<NodeId, BTreeSet<ValueId>> = BTreeMap::new();
    for (node_id, value_id) in values.keys().chain(metadata.keys()) {
        index.entry(*node_id).or_default().insert(value_id.clone());
    }
    index
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_index_covers_both_dbs() {
        let mut values = ValueDB::default();
        let mut metadata = MetadataDB::default();

        let node2 = NodeId::new(2);
        let node3 = NodeId::new(3);
        values.set(
            node2,
            ValueId::new(CommandClasses::Basic, "currentValue"),
            99u8,
        );
        metadata.set(
            node3,
            ValueId::new(CommandClasses::Version, "libraryType"),
            ValueMetadata::default(),
        );

        let index = index_dbs_by_node(&values, &metadata);
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&node2).unwrap().len(), 1);
        assert_eq!(index.get(&node3).unwrap().len(), 1);
    }

    #[test]
    fn test_remove_all_of_node() {
        let mut values = ValueDB::default();
        let node2 = NodeId::new(2);
        let node3 = NodeId::new(3);
        values.set(node2, ValueId::new(CommandClasses::Basic, "a"), 1u8);
        values.set(node3, ValueId::new(CommandClasses::Basic, "a"), 2u8);

        values.remove_all_of_node(node2);
        assert!(
            values
                .get(node2, &ValueId::new(CommandClasses::Basic, "a"))
                .is_none()
        );
        assert!(
            values
                .get(node3, &ValueId::new(CommandClasses::Basic, "a"))
                .is_some()
        );
    }
}
