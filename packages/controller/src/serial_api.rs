use futures::channel::{mpsc, oneshot};
use std::time::Duration;
use typed_builder::TypedBuilder;
use zwnet_serial::error::{ExecCommandError, ExecCommandResult};
use zwnet_serial::prelude::*;

pub type CommandPredicate = Box<dyn Fn(&Command) -> bool + Send + Sync>;

/// How urgent a message is relative to others waiting in the transport queue
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MessagePriority {
    /// Network management commands that must not be interleaved with node traffic
    Controller,
    Ping,
    #[default]
    Normal,
    Poll,
}

#[derive(Clone, TypedBuilder)]
pub struct SendCommandOptions {
    /// Fail when the command is not known to be supported by the stick.
    /// Disabled while the capabilities haven't been determined yet.
    #[builder(default = true)]
    pub enforce_support: bool,
    /// Drops the command if it cannot be handled within this duration
    #[builder(default, setter(strip_option, into))]
    pub expire: Option<Duration>,
    #[builder(default)]
    pub priority: MessagePriority,
}

impl Default for SendCommandOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl SendCommandOptions {
    /// Options for network management commands, which must not be interleaved
    /// with normal node traffic
    pub fn controller_priority() -> Self {
        Self::builder().priority(MessagePriority::Controller).build()
    }
}

/// Inputs understood by the transport behind the [SerialApi] handle
pub enum SerialApiInput {
    /// Execute the given command and return the result once it's done
    ExecCommand {
        command: Command,
        options: SendCommandOptions,
        callback: oneshot::Sender<ExecCommandResult<Option<Command>>>,
    },
    /// Reject all queued and in-flight transactions matching the predicate
    RejectTransactions { predicate: CommandPredicate },
}

/// The sending half of the transport. The byte-level actor servicing the
/// other end of the channel owns framing, checksumming and timing; this
/// handle only speaks typed commands.
#[derive(Clone)]
pub struct SerialApi {
    input_tx: mpsc::UnboundedSender<SerialApiInput>,
}

pub struct SerialApiAdapter {
    pub input_rx: mpsc::UnboundedReceiver<SerialApiInput>,
}

impl SerialApi {
    pub fn new() -> (Self, SerialApiAdapter) {
        let (input_tx, input_rx) = mpsc::unbounded();
        (Self { input_tx }, SerialApiAdapter { input_rx })
    }

    pub async fn execute_command(
        &self,
        command: impl Into<Command>,
        options: &SendCommandOptions,
    ) -> ExecCommandResult<Option<Command>> {
        let (callback, result_rx) = oneshot::channel();
        let input = SerialApiInput::ExecCommand {
            command: command.into(),
            options: options.clone(),
            callback,
        };
        self.input_tx
            .unbounded_send(input)
            .map_err(|_| ExecCommandError::Unexpected("the serial task is gone".to_string()))?;

        let await_result = |result: Result<_, oneshot::Canceled>| {
            result.unwrap_or_else(|_| {
                Err(ExecCommandError::Unexpected(
                    "the serial task dropped the command".to_string(),
                ))
            })
        };

        match options.expire {
            Some(expire) => match tokio::time::timeout(expire, result_rx).await {
                Ok(result) => await_result(result),
                Err(_) => Err(ExecCommandError::Expired),
            },
            None => await_result(result_rx.await),
        }
    }

    pub fn reject_transactions(&self, predicate: CommandPredicate) {
        let _ = self
            .input_tx
            .unbounded_send(SerialApiInput::RejectTransactions { predicate });
    }
}
