use super::expect_controller_command_result;
use crate::error::{ControllerError, Result};
use crate::{Controller, Init, Ready, SendCommandOptions};
use futures::future::BoxFuture;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use typed_builder::TypedBuilder;
use zwnet_core::prelude::*;
use zwnet_logging::Loglevel;
use zwnet_serial::command::{
    Command, CommandBase, GetControllerCapabilitiesRequest, GetControllerIdRequest,
    GetControllerVersionRequest, GetSerialApiCapabilitiesRequest, GetSerialApiInitDataRequest,
    GetSucNodeIdRequest, SetSerialApiTimeoutsRequest, SetSucNodeIdRequest,
};

pub type InterviewHook =
    Box<dyn for<'a> Fn(&'a Controller<Ready>) -> BoxFuture<'a, Result<()>> + Send + Sync>;

/// Callbacks into the embedding driver that run at fixed points of the
/// controller interview
#[derive(Default, TypedBuilder)]
pub struct InterviewHooks {
    /// Opens the value/metadata databases before any node is created
    #[builder(default, setter(strip_option))]
    pub init_value_dbs: Option<InterviewHook>,
    /// Restores the previously serialized node state into the registry
    #[builder(default, setter(strip_option))]
    pub restore_from_cache: Option<InterviewHook>,
}

impl Controller<Init> {
    /// Queries the stick's identity and capabilities, seeds the node registry
    /// and leaves the controller ready for normal operation. Any transport
    /// error aborts the interview; capability queries keep failing with
    /// [ControllerError::NotReady] in that case.
    pub async fn interview(&self, hooks: &InterviewHooks) -> Result<Controller<Ready>> {
        // We execute these commands before knowing the controller capabilities,
        // so we disable enforcing that the controller supports them.
        let no_support_check = SendCommandOptions::builder().enforce_support(false).build();
        let command_options = Some(&no_support_check);

        let log = self.controller_log();
        log.info(|| "beginning interview...");

        let version_info = {
            let response = self
                .exec_controller_command(GetControllerVersionRequest::default(), command_options)
                .await;
            expect_controller_command_result!(response, GetControllerVersionResponse)
        };
        log.info(|| {
            format!(
                "received controller version info: {} ({})",
                version_info.library_version, version_info.library_type
            )
        });

        let ids = {
            let response = self
                .exec_controller_command(GetControllerIdRequest::default(), command_options)
                .await;
            expect_controller_command_result!(response, GetControllerIdResponse)
        };
        log.info(|| {
            format!(
                "received controller IDs: home ID {:#010x}, own node ID {}",
                ids.home_id, ids.own_node_id
            )
        });

        let capabilities = {
            let response = self
                .exec_controller_command(
                    GetControllerCapabilitiesRequest::default(),
                    command_options,
                )
                .await;
            expect_controller_command_result!(response, GetControllerCapabilitiesResponse)
        };

        let api_capabilities = {
            let response = self
                .exec_controller_command(GetSerialApiCapabilitiesRequest::default(), command_options)
                .await;
            expect_controller_command_result!(response, GetSerialApiCapabilitiesResponse)
        };

        let suc_node_id = {
            let response = self
                .exec_controller_command(GetSucNodeIdRequest::default(), command_options)
                .await;
            expect_controller_command_result!(response, GetSucNodeIdResponse).suc_node_id
        };

        let mut storage = super::ControllerStorage::builder()
            .home_id(ids.home_id)
            .own_node_id(ids.own_node_id)
            .suc_node_id(suc_node_id)
            .library_version(version_info.library_version)
            .library_type(version_info.library_type)
            .serial_api_version(api_capabilities.serial_api_version)
            .fingerprint(DeviceFingerprint::new(
                api_capabilities.manufacturer_id,
                api_capabilities.product_type,
                api_capabilities.product_id,
            ))
            .is_secondary(capabilities.is_secondary)
            .is_using_home_id_from_other_network(capabilities.is_using_home_id_from_other_network)
            .sis_present(capabilities.sis_present)
            .was_real_primary(capabilities.was_real_primary)
            .is_static_update_controller(capabilities.is_static_update_controller)
            .supported_function_types(api_capabilities.supported_function_types)
            .build();
        storage.index_supported_functions();

        let controller = Controller {
            serial_api: self.serial_api.clone(),
            options: self.options.clone(),
            logger: self.logger.clone(),
            events: self.events.clone(),
            values: self.values.clone(),
            metadata: self.metadata.clone(),
            security_manager: self.security_manager.clone(),
            awaited_ccs: self.awaited_ccs.clone(),
            state: Ready {
                storage: Arc::new(RwLock::new(storage)),
                nodes: Arc::new(RwLock::new(BTreeMap::new())),
            },
        };

        if let Some(network_key) = &controller.options().network_key {
            log.info(|| "network key for S0 configured, enabling S0 security manager...");
            let sec_storage = SecurityManagerStorage::new(SecurityManagerOptions {
                own_node_id: ids.own_node_id,
                network_key: network_key.clone(),
            });
            controller.set_security_manager(SecurityManager::new(Arc::new(sec_storage)));
        } else {
            log.warn(|| {
                "no network key for S0 configured, communication with secure (S0) devices won't work!"
            });
        }

        controller.promote_to_suc_if_needed(&capabilities).await;

        if let Some(hook) = &hooks.init_value_dbs {
            hook(&controller).await?;
        }

        let init_data = {
            let response = controller
                .exec_controller_command(GetSerialApiInitDataRequest::default(), None)
                .await;
            expect_controller_command_result!(response, GetSerialApiInitDataResponse)
        };

        {
            let mut storage = controller.storage_mut();
            storage.is_slave = init_data.is_slave;
            storage.supports_timers = init_data.supports_timers;
        }

        // Seed the registry, handing every node its precomputed value index
        {
            let mut index = {
                let values = controller.value_db();
                let metadata = controller.metadata_db();
                index_dbs_by_node(&values, &metadata)
            };
            let mut nodes = controller.node_storage_mut();
            for node_id in &init_data.node_ids {
                let mut node = crate::node::NodeStorage::placeholder();
                if let Some(value_index) = index.remove(node_id) {
                    node.value_index = value_index;
                }
                nodes.insert(*node_id, node);
            }
            // Whatever the init data said, our own node is part of the network
            nodes
                .entry(ids.own_node_id)
                .or_insert_with(crate::node::NodeStorage::placeholder);
        }
        log.info(|| format!("the network has {} nodes", controller.node_ids().len()));

        if let Some(hook) = &hooks.restore_from_cache {
            hook(&controller).await?;
        }

        // Record what we know about ourselves
        {
            let own_node_id = controller.own_node_id();
            let fingerprint = controller.fingerprint();
            let mut values = controller.value_db_mut();
            values.set(
                own_node_id,
                ValueId::new(CommandClasses::ManufacturerSpecific, "manufacturerId"),
                fingerprint.manufacturer_id,
            );
            values.set(
                own_node_id,
                ValueId::new(CommandClasses::ManufacturerSpecific, "productType"),
                fingerprint.product_type,
            );
            values.set(
                own_node_id,
                ValueId::new(CommandClasses::ManufacturerSpecific, "productId"),
                fingerprint.product_id,
            );
        }
        if let Some(own_node) = controller.get_node(&ids.own_node_id) {
            own_node.mark_as_alive();
        }

        // Bridge sticks reject this command even when they claim support
        if controller.library_type() != ZWaveLibraryType::BridgeController
            && controller.supports_function(FunctionType::SetSerialApiTimeouts)
        {
            let timeouts = controller.options().timeouts;
            let cmd = SetSerialApiTimeoutsRequest::builder()
                .ack_timeout_10ms((timeouts.ack.as_millis() / 10) as u8)
                .byte_timeout_10ms((timeouts.byte.as_millis() / 10) as u8)
                .build();
            let response = controller.exec_controller_command(cmd, None).await;
            let previous =
                expect_controller_command_result!(response, SetSerialApiTimeoutsResponse);
            log.debug(|| {
                format!(
                    "serial API timeouts configured, previous: ack {} ms, byte {} ms",
                    previous.previous_ack_timeout_10ms as u16 * 10,
                    previous.previous_byte_timeout_10ms as u16 * 10
                )
            });
        }

        log.info(|| "interview completed");
        Ok(controller)
    }
}

impl Controller<Ready> {
    /// There needs to be a SUC/SIS in the network. If there is none and we can
    /// take the role, we promote ourselves. Failure is logged but not fatal.
    async fn promote_to_suc_if_needed(
        &self,
        capabilities: &zwnet_serial::command::GetControllerCapabilitiesResponse,
    ) {
        let log = self.controller_log();

        let should_promote = !capabilities.is_secondary
            && !capabilities.is_static_update_controller
            && !capabilities.sis_present
            && self.suc_node_id().is_none();

        if !should_promote {
            log.info(|| "there is a SUC/SIS in the network - not promoting ourselves");
            return;
        }

        log.info(|| "there is no SUC/SIS in the network - promoting ourselves...");
        let own_node_id = self.own_node_id();
        match self.configure_suc(own_node_id, true, true).await {
            Ok(success) => {
                log.message(
                    || {
                        format!(
                            "promotion to SUC/SIS {}",
                            if success { "succeeded" } else { "failed" }
                        )
                    },
                    if success {
                        Loglevel::Info
                    } else {
                        Loglevel::Warn
                    },
                );
            }
            Err(e) => {
                log.error(|| format!("error while promoting to SUC/SIS: {}", e));
            }
        }
    }

    /// Makes the given node the SUC and/or SIS of the network
    pub(crate) async fn configure_suc(
        &self,
        node_id: NodeId,
        enable_suc: bool,
        enable_sis: bool,
    ) -> Result<bool> {
        let cmd = SetSucNodeIdRequest::builder()
            .own_node_id(self.own_node_id())
            .suc_node_id(node_id)
            .enable_suc(enable_suc)
            .enable_sis(enable_sis)
            .build();

        let response = self.exec_controller_command(cmd, None).await;
        let success = match response {
            Ok(Some(Command::SetSucNodeIdResponse(result))) => result.is_ok(),
            Ok(Some(Command::SetSucNodeIdCallback(result))) => result.is_ok(),
            Ok(_) => {
                return Err(ControllerError::Unexpected(
                    "expected SetSucNodeIdResponse or SetSucNodeIdCallback".to_string(),
                ));
            }
            Err(e) => return Err(e),
        };

        if success {
            let own_node_id = self.own_node_id();
            let mut storage = self.storage_mut();
            storage.suc_node_id = Some(node_id);
            if node_id == own_node_id {
                storage.is_static_update_controller = enable_suc;
                storage.sis_present = enable_sis;
            }
        }

        Ok(success)
    }
}
