// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::provisioning::chain::{HandlerOutcome, ProvisioningHandler};
use crate::provisioning::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::programmer::MessageType;
use crate::provisioning::transfer::ProvisioningTransferObject;
use async_trait::async_trait;

/// Rejects programmers that cannot carry what the configuration needs.
#[derive(Debug, Default)]
pub struct ProvSupportedCommandsComponent;

#[async_trait]
impl ProvisioningHandler for ProvSupportedCommandsComponent {
    fn name(&self) -> &'static str {
        "ProvSupportedCommandsComponent"
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        let supported = transfer.dto().supported_commands;
        if !MessageType::are_set_in(MessageType::SEND_PACKET, supported) {
            return Err(ProvisioningError::CommandNotSupported(
                "SEND_PACKET".to_string(),
            ));
        }

        let cfg_id = transfer.cfg_id();
        let configuration = transfer.get_configuration(cfg_id)?;
        let confidential_data = configuration
            .confidential_data
            .as_ref()
            .ok_or(ProvisioningError::InvalidConfiguration(cfg_id))?;
        if confidential_data.aes_key.storage.is_key_wrapping()
            && !MessageType::at_least_one_is_set_in(MessageType::PUSH_WRAPPED_KEYS, supported)
        {
            return Err(ProvisioningError::CommandNotSupported(
                "PUSH_WRAPPED_KEY".to_string(),
            ));
        }
        Ok(HandlerOutcome::Next)
    }
}
