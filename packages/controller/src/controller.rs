use crate::awaited::AwaitedRegistry;
use crate::error::{ControllerError, Result};
use crate::node::NodeStorage;
use crate::{
    ControllerEvent, ControllerOptions, EventBus, Node, SendCommandOptions, SerialApi,
};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use zwnet_cc::commandclass::{CC, WithAddress};
use zwnet_core::prelude::*;
use zwnet_core::submodule;
use zwnet_logging::ImmutableLogger;
use zwnet_logging::loggers::{controller::ControllerLogger, node::NodeLogger};
use zwnet_serial::command::{Command, CommandRequest};

submodule!(associations);
submodule!(cache);
submodule!(exclusion);
submodule!(hard_reset);
submodule!(heal);
submodule!(inclusion);
submodule!(interview);
submodule!(lifeline);
submodule!(replace);
submodule!(security_bootstrap);

mod storage;
pub(crate) use storage::*;

/// The controller API can be in one of multiple states, each of which has a different set of capabilities.
pub trait ControllerState {
    /// Checks whether a given Z-Wave function type is supported by the stick.
    /// Fails until the interview has determined the capabilities.
    fn supports_function(&self, function_type: FunctionType) -> Result<bool>;
}

/// The controller isn't fully initialized yet
pub struct Init;

impl ControllerState for Init {
    fn supports_function(&self, _function_type: FunctionType) -> Result<bool> {
        Err(ControllerError::NotReady)
    }
}

/// The controller is ready to use normally
#[derive(Clone)]
pub struct Ready {
    pub(crate) storage: Arc<RwLock<ControllerStorage>>,
    pub(crate) nodes: Arc<RwLock<BTreeMap<NodeId, NodeStorage>>>,
}

impl ControllerState for Ready {
    fn supports_function(&self, function_type: FunctionType) -> Result<bool> {
        let storage = self
            .storage
            .read()
            .expect("failed to lock controller storage for reading");
        Ok(storage.supports_function(function_type))
    }
}

pub struct Controller<S: ControllerState> {
    serial_api: SerialApi,
    options: Arc<ControllerOptions>,
    logger: Arc<dyn ImmutableLogger>,
    events: Arc<EventBus>,
    values: Arc<RwLock<ValueDB>>,
    metadata: Arc<RwLock<MetadataDB>>,
    security_manager: Arc<RwLock<Option<SecurityManager>>>,
    awaited_ccs: Arc<AwaitedRegistry<WithAddress<CC>>>,
    state: S,
}

impl Controller<Init> {
    pub fn new(
        serial_api: SerialApi,
        options: ControllerOptions,
        logger: Arc<dyn ImmutableLogger>,
    ) -> Self {
        Self {
            serial_api,
            options: Arc::new(options),
            logger,
            events: Arc::new(EventBus::new()),
            values: Arc::new(RwLock::new(ValueDB::default())),
            metadata: Arc::new(RwLock::new(MetadataDB::default())),
            security_manager: Arc::new(RwLock::new(None)),
            awaited_ccs: Arc::new(AwaitedRegistry::default()),
            state: Init,
        }
    }
}

impl<S: ControllerState> Controller<S> {
    pub fn serial_api(&self) -> &SerialApi {
        &self.serial_api
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    /// Checks whether a given Z-Wave function type is supported by the stick.
    /// Before the interview has run, this fails with [ControllerError::NotReady].
    pub fn is_function_supported(&self, function_type: FunctionType) -> Result<bool> {
        self.state.supports_function(function_type)
    }

    pub(crate) fn controller_log(&self) -> ControllerLogger {
        ControllerLogger::new(self.logger.clone())
    }

    pub(crate) fn node_log(&self, node_id: NodeId, endpoint: EndpointIndex) -> NodeLogger {
        NodeLogger::new(self.logger.clone(), node_id, endpoint)
    }

    pub async fn exec_controller_command<C>(
        &self,
        command: C,
        options: Option<&SendCommandOptions>,
    ) -> Result<Option<Command>>
    where
        C: CommandRequest + Into<Command>,
    {
        let options = options.cloned().unwrap_or_default();

        if options.enforce_support && !self.state.supports_function(command.function_type())? {
            return Err(ControllerError::Unsupported(format!(
                "{:?}",
                command.function_type()
            )));
        }

        Ok(self.serial_api.execute_command(command, &options).await?)
    }
}

impl Controller<Ready> {
    pub(crate) fn storage(&self) -> RwLockReadGuard<'_, ControllerStorage> {
        self.state
            .storage
            .read()
            .expect("failed to lock controller storage for reading")
    }

    pub(crate) fn storage_mut(&self) -> RwLockWriteGuard<'_, ControllerStorage> {
        self.state
            .storage
            .write()
            .expect("failed to lock controller storage for writing")
    }

    pub(crate) fn node_storage(&self) -> RwLockReadGuard<'_, BTreeMap<NodeId, NodeStorage>> {
        self.state
            .nodes
            .read()
            .expect("failed to lock node storage for reading")
    }

    pub(crate) fn node_storage_mut(
        &self,
    ) -> RwLockWriteGuard<'_, BTreeMap<NodeId, NodeStorage>> {
        self.state
            .nodes
            .write()
            .expect("failed to lock node storage for writing")
    }

    pub(crate) fn awaited_ccs(&self) -> &Arc<AwaitedRegistry<WithAddress<CC>>> {
        &self.awaited_ccs
    }

    pub(crate) fn emit(&self, event: ControllerEvent) {
        self.events.emit(event);
    }

    pub fn subscribe(&self) -> futures::channel::mpsc::UnboundedReceiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub fn value_db(&self) -> RwLockReadGuard<'_, ValueDB> {
        self.values
            .read()
            .expect("failed to lock value DB for reading")
    }

    pub fn value_db_mut(&self) -> RwLockWriteGuard<'_, ValueDB> {
        self.values
            .write()
            .expect("failed to lock value DB for writing")
    }

    pub fn metadata_db(&self) -> RwLockReadGuard<'_, MetadataDB> {
        self.metadata
            .read()
            .expect("failed to lock metadata DB for reading")
    }

    pub fn metadata_db_mut(&self) -> RwLockWriteGuard<'_, MetadataDB> {
        self.metadata
            .write()
            .expect("failed to lock metadata DB for writing")
    }

    pub(crate) fn security_manager(&self) -> Option<SecurityManager> {
        self.security_manager
            .read()
            .expect("failed to lock security manager")
            .clone()
    }

    pub(crate) fn set_security_manager(&self, manager: SecurityManager) {
        self.security_manager
            .write()
            .expect("failed to lock security manager")
            .replace(manager);
    }

    /// Checks whether a given Z-Wave function type is supported by the stick.
    pub fn supports_function(&self, function_type: FunctionType) -> bool {
        self.storage().supports_function(function_type)
    }

    pub fn home_id(&self) -> u32 {
        self.storage().home_id
    }

    pub fn own_node_id(&self) -> NodeId {
        self.storage().own_node_id
    }

    pub fn suc_node_id(&self) -> Option<NodeId> {
        self.storage().suc_node_id
    }

    pub(crate) fn set_suc_node_id(&self, suc_node_id: Option<NodeId>) {
        self.storage_mut().suc_node_id = suc_node_id;
    }

    pub fn library_version(&self) -> String {
        self.storage().library_version.clone()
    }

    pub fn library_type(&self) -> ZWaveLibraryType {
        self.storage().library_type
    }

    pub fn serial_api_version(&self) -> String {
        self.storage().serial_api_version.clone()
    }

    pub fn fingerprint(&self) -> DeviceFingerprint {
        self.storage().fingerprint
    }

    pub fn is_secondary(&self) -> bool {
        self.storage().is_secondary
    }

    pub fn is_using_home_id_from_other_network(&self) -> bool {
        self.storage().is_using_home_id_from_other_network
    }

    pub fn is_static_update_controller(&self) -> bool {
        self.storage().is_static_update_controller
    }

    pub fn sis_present(&self) -> bool {
        self.storage().sis_present
    }

    pub fn was_real_primary(&self) -> bool {
        self.storage().was_real_primary
    }

    pub fn is_slave(&self) -> bool {
        self.storage().is_slave
    }

    pub fn supports_timers(&self) -> bool {
        self.storage().supports_timers
    }

    pub fn inclusion_active(&self) -> bool {
        self.storage().inclusion_active
    }

    pub fn exclusion_active(&self) -> bool {
        self.storage().exclusion_active
    }

    pub fn heal_active(&self) -> bool {
        self.storage().heal_active
    }

    /// Returns a handle to the node if it is known
    pub fn get_node(&self, node_id: &NodeId) -> Option<Node> {
        if self.node_storage().contains_key(node_id) {
            Some(Node::new(*node_id, self.clone()))
        } else {
            None
        }
    }

    /// Like [Self::get_node], but failing with [ControllerError::NodeNotFound]
    pub fn get_node_or_err(&self, node_id: &NodeId) -> Result<Node> {
        self.get_node(node_id)
            .ok_or(ControllerError::NodeNotFound(*node_id))
    }

    pub fn node_ids(&self) -> Vec<NodeId> {
        self.node_storage().keys().copied().collect()
    }

    /// Dispatches an unsolicited command from the stick to the matching
    /// handler. Returns whether the command was handled. The embedding driver
    /// must await each invocation before delivering the next command, so
    /// every handler runs to completion in arrival order.
    pub async fn handle_serial_callback(&self, command: Command) -> Result<bool> {
        match &command {
            Command::AddNodeToNetworkCallback(callback) => {
                self.handle_add_node_status_report(callback).await
            }
            Command::RemoveNodeFromNetworkCallback(callback) => {
                self.handle_remove_node_status_report(callback).await
            }
            Command::ReplaceFailedNodeCallback(callback) => {
                self.handle_replace_node_status_report(callback).await
            }
            Command::HardResetCallback(_) => Ok(self.handle_hard_reset_callback()),
            Command::ApplicationCommandRequest(request) => {
                if let Some(channel) = self.awaited_ccs.take_matching(&request.command) {
                    let _ = channel.send(request.command.clone());
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
impl Controller<Ready> {
    /// Builds a ready controller directly from prepared storage, bypassing
    /// the interview
    pub(crate) fn test_instance(
        serial_api: SerialApi,
        options: ControllerOptions,
        storage: ControllerStorage,
        nodes: BTreeMap<NodeId, NodeStorage>,
    ) -> Self {
        Self {
            serial_api,
            options: Arc::new(options),
            logger: Arc::new(zwnet_logging::loggers::base::NullLogger),
            events: Arc::new(EventBus::new()),
            values: Arc::new(RwLock::new(ValueDB::default())),
            metadata: Arc::new(RwLock::new(MetadataDB::default())),
            security_manager: Arc::new(RwLock::new(None)),
            awaited_ccs: Arc::new(AwaitedRegistry::default()),
            state: Ready {
                storage: Arc::new(RwLock::new(storage)),
                nodes: Arc::new(RwLock::new(nodes)),
            },
        }
    }
}

impl Clone for Controller<Ready> {
    fn clone(&self) -> Self {
        Self {
            serial_api: self.serial_api.clone(),
            options: self.options.clone(),
            logger: self.logger.clone(),
            events: self.events.clone(),
            values: self.values.clone(),
            metadata: self.metadata.clone(),
            security_manager: self.security_manager.clone(),
            awaited_ccs: self.awaited_ccs.clone(),
            state: self.state.clone(),
        }
    }
}

macro_rules! expect_controller_command_result {
    ($actual:expr, $expected:ident) => {
        match $actual {
            Ok(Some(Command::$expected(result))) => result,
            Ok(_) => {
                return Err(crate::error::ControllerError::Unexpected(
                    concat!("expected ", stringify!($expected)).to_string(),
                ));
            }
            Err(e) => return Err(e),
        }
    };
}
pub(crate) use expect_controller_command_result;
