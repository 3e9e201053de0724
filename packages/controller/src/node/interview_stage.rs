use serde::{Deserialize, Serialize};

/// How far the interview of a node has progressed
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum InterviewStage {
    #[default]
    None,
    /// The protocol-level information has been queried from the stick
    ProtocolInfo,
    /// The NIF has been received
    NodeInfo,
    /// The supported CCs are being interviewed
    CommandClasses,
    Complete,
}
