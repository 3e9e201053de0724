use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Our knowledge about whether a node is currently reachable
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    #[default]
    Unknown,
    Alive,
    Dead,
    Asleep,
}

impl Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
