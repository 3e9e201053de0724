use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};

/// The address of a node in the network. Z-Wave Classic networks use 8-bit node IDs.
#[derive(
    Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct NodeId(u8);

pub const NODE_ID_UNSPECIFIED: NodeId = NodeId(0);
pub const NODE_ID_BROADCAST: NodeId = NodeId(0xff);

impl NodeId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn broadcast() -> Self {
        NODE_ID_BROADCAST
    }

    pub const fn unspecified() -> Self {
        NODE_ID_UNSPECIFIED
    }
}

impl Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:0>3}", self.0)
    }
}

impl From<u8> for NodeId {
    fn from(val: u8) -> Self {
        Self(val)
    }
}

impl From<NodeId> for u8 {
    fn from(val: NodeId) -> Self {
        val.0
    }
}

impl PartialEq<u8> for NodeId {
    fn eq(&self, other: &u8) -> bool {
        self.0 == *other
    }
}
