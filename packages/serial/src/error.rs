use crate::command::Command;
use thiserror::Error;

/// The low-level result of a Serial API command execution
pub type ExecCommandResult<T> = Result<T, ExecCommandError>;

/// The ways a Serial API command execution can fail at the transport level
#[derive(Error, Debug)]
pub enum ExecCommandError {
    #[error("ACK timeout")]
    AckTimeout,
    #[error("Response timeout")]
    ResponseTimeout,
    #[error("The response indicated an error")]
    ResponseNOK(Command),
    #[error("Callback timeout")]
    CallbackTimeout,
    #[error("The callback indicated an error")]
    CallbackNOK(Command),
    #[error("The message expired before it could be sent")]
    Expired,
    #[error("The transaction was rejected")]
    Dropped,
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
