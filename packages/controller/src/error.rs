use thiserror::Error;
use zwnet_core::definitions::{CommandClasses, NodeId};
use zwnet_serial::error::ExecCommandError;

pub type Result<T> = std::result::Result<T, ControllerError>;

/// The closed set of errors the controller core surfaces to its users
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("The driver is not ready")]
    NotReady,
    #[error("Node {0} was not found")]
    NodeNotFound(NodeId),
    #[error("Endpoint {endpoint} of node {node_id} was not found")]
    EndpointNotFound { node_id: NodeId, endpoint: u8 },
    #[error("The inclusion could not be started")]
    InclusionFailed,
    #[error("The exclusion could not be started")]
    ExclusionFailed,
    #[error("The message expired before it could be handled")]
    MessageExpired,
    #[error("The message was dropped")]
    MessageDropped,
    #[error("Timed out waiting for a response from the node")]
    NodeTimeout,
    #[error("The cached data is invalid: {0}")]
    InvalidCache(String),
    #[error("Node {node_id} does not support {cc}")]
    CCNotSupported {
        node_id: NodeId,
        cc: CommandClasses,
    },
    #[error("Group {group_id} does not exist on node {node_id}")]
    InvalidGroup { node_id: NodeId, group_id: u8 },
    #[error("The associations are not allowed: {0}")]
    NotAllowed(String),
    #[error("The node could not be replaced because it is still responding")]
    ReplaceFailedNodeOK,
    #[error("Replacing the node failed: {0}")]
    ReplaceFailedNodeFailed(String),
    #[error("The node could not be removed because it is still part of the network")]
    RemoveFailedNodeOK,
    #[error("Removing the node failed: {0}")]
    RemoveFailedNodeFailed(String),
    #[error("Command not supported: {0}")]
    Unsupported(String),
    #[error(transparent)]
    Transport(#[from] ExecCommandError),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
