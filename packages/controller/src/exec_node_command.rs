use crate::awaited::AwaitError;
use crate::error::ControllerError;
use crate::{Controller, Ready, SendCommandOptions};
use std::time::Duration;
use thiserror::Error;
use typed_builder::TypedBuilder;
use zwnet_cc::commandclass::{CC, CCBase, Destination, WithAddress};
use zwnet_core::prelude::*;
use zwnet_serial::command::{Command, SendDataRequest};
use zwnet_serial::error::ExecCommandError;

/// The result of a node command execution
pub type ExecNodeCommandResult<T> = Result<T, ExecNodeCommandError>;

/// Defines the possible errors for a node command execution
#[derive(Error, Debug)]
pub enum ExecNodeCommandError {
    #[error(transparent)]
    Transport(#[from] ExecCommandError),
    #[error("The node did not acknowledge the command")]
    NodeNoAck,
    #[error("Timed out waiting for a response from the node")]
    NodeTimeout,
}

impl From<ExecNodeCommandError> for ControllerError {
    fn from(value: ExecNodeCommandError) -> Self {
        match value {
            ExecNodeCommandError::Transport(e) => ControllerError::Transport(e),
            ExecNodeCommandError::NodeTimeout => ControllerError::NodeTimeout,
            ExecNodeCommandError::NodeNoAck => {
                ControllerError::Unexpected("the node did not acknowledge the command".to_string())
            }
        }
    }
}

impl ExecNodeCommandError {
    /// Collapses the failure into the controller-level error kind used when
    /// logging bootstrap problems
    pub(crate) fn categorize(&self) -> ControllerError {
        match self {
            ExecNodeCommandError::Transport(ExecCommandError::Expired) => {
                ControllerError::MessageExpired
            }
            ExecNodeCommandError::Transport(ExecCommandError::Dropped) => {
                ControllerError::MessageDropped
            }
            ExecNodeCommandError::NodeTimeout => ControllerError::NodeTimeout,
            other => ControllerError::Unexpected(other.to_string()),
        }
    }
}

#[derive(Clone, TypedBuilder)]
pub struct ExecNodeCommandOptions {
    /// Drops the command if the transport cannot handle it within this duration
    #[builder(default, setter(strip_option, into))]
    pub expire: Option<Duration>,
    /// How long to wait for the node's CC response
    #[builder(default = Duration::from_secs(10))]
    pub response_timeout: Duration,
}

impl Default for ExecNodeCommandOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Controller<Ready> {
    /// Sends a CC to a node and waits for the expected CC response, if there is one
    pub(crate) async fn exec_node_command(
        &self,
        cc: &WithAddress<CC>,
        options: Option<&ExecNodeCommandOptions>,
    ) -> ExecNodeCommandResult<Option<CC>> {
        let options = options.cloned().unwrap_or_default();

        let node_id = match cc.address().destination {
            Destination::Singlecast(node_id) => node_id,
            Destination::Broadcast => NodeId::broadcast(),
        };

        // Register interest in the response before sending. Some nodes answer
        // faster than the SendData callback arrives.
        let awaited_response = if cc.expects_response() {
            let request = cc.clone();
            Some(self.awaited_ccs().add(
                Box::new(move |received| test_cc_response(&request, received)),
                Some(options.response_timeout),
            ))
        } else {
            None
        };

        let controller_command = SendDataRequest::builder()
            .node_id(node_id)
            .command((**cc).clone())
            .build();
        let mut send_options = SendCommandOptions::default();
        send_options.expire = options.expire;

        let result = self
            .exec_controller_command(controller_command, Some(&send_options))
            .await;

        match result {
            Ok(Some(Command::SendDataResponse(_)))
            | Ok(Some(Command::SendDataCallback(_)))
            | Ok(None) => {}
            Ok(Some(other)) => {
                return Err(ExecCommandError::Unexpected(format!(
                    "unexpected response to SendDataRequest: {:?}",
                    other
                ))
                .into());
            }
            Err(ControllerError::Transport(ExecCommandError::CallbackNOK(_))) => {
                return Err(ExecNodeCommandError::NodeNoAck);
            }
            Err(ControllerError::Transport(e)) => return Err(e.into()),
            Err(e) => {
                return Err(ExecCommandError::Unexpected(e.to_string()).into());
            }
        }

        let Some(awaited_response) = awaited_response else {
            return Ok(None);
        };

        match awaited_response.try_await().await {
            Ok(received) => Ok(Some(received.into_inner())),
            Err(AwaitError::Timeout) => Err(ExecNodeCommandError::NodeTimeout),
            Err(AwaitError::Dropped) => Err(ExecCommandError::Unexpected(
                "the awaited CC response went away".to_string(),
            )
            .into()),
        }
    }
}

/// Tests if the given CC response is the expected CC response to the given CC request
fn test_cc_response(request: &WithAddress<CC>, response: &WithAddress<CC>) -> bool {
    if !request.expects_response() {
        return false;
    }

    if let Destination::Singlecast(target) = request.address().destination {
        response.address().source_node_id == target && request.test_response(response)
    } else {
        false
    }
}
