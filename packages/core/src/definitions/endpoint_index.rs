use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Addresses the root device or one of its multi-channel endpoints
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EndpointIndex {
    #[default]
    Root,
    Endpoint(u8),
}

impl EndpointIndex {
    pub fn index(&self) -> u8 {
        match self {
            Self::Root => 0,
            Self::Endpoint(index) => *index,
        }
    }
}

impl From<u8> for EndpointIndex {
    fn from(val: u8) -> Self {
        if val == 0 {
            Self::Root
        } else {
            Self::Endpoint(val)
        }
    }
}

impl Display for EndpointIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Endpoint(index) => write!(f, "endpoint {}", index),
        }
    }
}
