// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! SPDM sub-chain: GET_CHIPID, secure session start, relay, done.

use super::{send_packet, single_response, HandlerDependencies};
use crate::provisioning::chain::{HandlerOutcome, ProvisioningHandler};
use crate::provisioning::collaborators::ServiceConfiguration;
use crate::provisioning::command::GetChipIdMessageSender;
use crate::provisioning::context::ProvSpdmContext;
use crate::provisioning::dto::ProvisioningResponseDtoBuilder;
use crate::provisioning::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::flow::FlowStage;
use crate::provisioning::overbuild::OverbuildCounterManager;
use crate::provisioning::transfer::ProvisioningTransferObject;
use crate::worker::{SpdmMessage, SpdmThreadError};
use async_trait::async_trait;

pub struct ProvSpdmGetChipIdComponent {
    deps: HandlerDependencies,
}

impl ProvSpdmGetChipIdComponent {
    pub fn new(deps: HandlerDependencies) -> Self {
        ProvSpdmGetChipIdComponent { deps }
    }
}

#[async_trait]
impl ProvisioningHandler for ProvSpdmGetChipIdComponent {
    fn name(&self) -> &'static str {
        "ProvSpdmGetChipIdComponent"
    }

    fn stage(&self) -> Option<FlowStage> {
        Some(FlowStage::ProtocolDecision)
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        if transfer.flow_stage() != self.stage() {
            return Ok(HandlerOutcome::Next);
        }
        info!("send GET_CHIPID.");
        let message = GetChipIdMessageSender::new(self.deps.command_layer.as_ref()).create();
        self.deps
            .response_builder()
            .with_messages(vec![message])
            .flow_stage(FlowStage::SpdmGetChipId)
            .protocol_type(transfer.protocol_type)
            .build()
            .map(HandlerOutcome::Respond)
            .map_err(ProvisioningError::into_generic)
    }
}

/// Checks the device may be provisioned, then starts the secure session.
pub struct ProvSpdmCreateComponent {
    deps: HandlerDependencies,
}

impl ProvSpdmCreateComponent {
    pub fn new(deps: HandlerDependencies) -> Self {
        ProvSpdmCreateComponent { deps }
    }

    fn ensure_overbuild_counter_not_exceeded(
        &self,
        device_id_hex: &str,
        configuration: &ServiceConfiguration,
    ) -> ProvisioningResult<()> {
        info!("Verify overbuild counter");
        OverbuildCounterManager::new(self.deps.history.as_ref())
            .verify_overbuild_counter(configuration, device_id_hex)
    }
}

fn ensure_corim_url_provided(configuration: &ServiceConfiguration) -> ProvisioningResult<()> {
    info!("Verify CoRIM url provided in configuration");
    if configuration.corim_url().is_none() {
        return Err(ProvisioningError::generic(
            "Missing CoRIM URL in configuration - required for attestation.",
        ));
    }
    Ok(())
}

#[async_trait]
impl ProvisioningHandler for ProvSpdmCreateComponent {
    fn name(&self) -> &'static str {
        "ProvSpdmCreateComponent"
    }

    fn stage(&self) -> Option<FlowStage> {
        Some(FlowStage::SpdmGetChipId)
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        if transfer.flow_stage() != self.stage() {
            return Ok(HandlerOutcome::Next);
        }
        info!("create SPDM protocol.");

        let policy = self.deps.spdm_service.retry_config().ensure_not_running;
        self.deps.ensure_process_is_not_running(policy).await?;

        let reader = transfer.dto_reader()?;
        let response = single_response(reader.jtag_responses())?;
        let device_id_hex =
            GetChipIdMessageSender::new(self.deps.command_layer.as_ref()).retrieve(response)?;
        info!("action will be performed for device: {}", device_id_hex);

        let cfg_id = reader.cfg_id();
        info!("Fetch configuration data for cfg id: {}", cfg_id);
        let configuration = transfer.get_configuration(cfg_id)?;
        self.ensure_overbuild_counter_not_exceeded(&device_id_hex, &configuration)?;
        ensure_corim_url_provided(&configuration)?;

        self.deps.spdm_service.start_secure_session(
            &device_id_hex,
            cfg_id,
            transfer.configuration_provider(),
        );
        let message = self.deps.first_message_from_worker().await?;

        self.deps
            .response_builder()
            .context(&ProvSpdmContext {
                device_id_hex,
                cfg_id,
            })
            .with_messages(send_packet(message))
            .flow_stage(FlowStage::SpdmSession)
            .protocol_type(transfer.protocol_type)
            .build()
            .map(HandlerOutcome::Respond)
            .map_err(ProvisioningError::into_generic)
    }
}

/// Relays the secure session until the worker finishes.
pub struct ProvSpdmCommunicationComponent {
    deps: HandlerDependencies,
}

impl ProvSpdmCommunicationComponent {
    pub fn new(deps: HandlerDependencies) -> Self {
        ProvSpdmCommunicationComponent { deps }
    }

    fn build_response(
        &self,
        message: SpdmMessage,
        context: &ProvSpdmContext,
        transfer: &ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        self.deps
            .response_builder()
            .context(context)
            .with_messages(send_packet(message))
            .flow_stage(FlowStage::SpdmSession)
            .protocol_type(transfer.protocol_type)
            .build()
            .map(HandlerOutcome::Respond)
            .map_err(ProvisioningError::into_generic)
    }
}

#[async_trait]
impl ProvisioningHandler for ProvSpdmCommunicationComponent {
    fn name(&self) -> &'static str {
        "ProvSpdmCommunicationComponent"
    }

    fn stage(&self) -> Option<FlowStage> {
        Some(FlowStage::SpdmSession)
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        if transfer.flow_stage() != self.stage() {
            return Ok(HandlerOutcome::Next);
        }
        info!("SPDM communication.");
        self.deps.ensure_service_is_processing()?;

        let reader = transfer.dto_reader()?;
        let context: ProvSpdmContext = reader.read().map_err(ProvisioningError::into_generic)?;
        let response = single_response(reader.jtag_responses())?.to_vec();
        self.deps
            .spdm_service
            .push_response_to_queue(SpdmMessage(response));

        match self.deps.next_message_from_worker().await? {
            Some(message) => self.build_response(message, &context, transfer),
            None => {
                let result = self
                    .deps
                    .spdm_service
                    .get_process_result()
                    .unwrap_or(SpdmThreadError::Failure);
                debug!("SPDM Service - process result: {}", result);
                if !result.is_success() {
                    return Err(ProvisioningError::Generic(format!(
                        "SPDM Process failed with status: {}",
                        result
                    )));
                }
                Ok(HandlerOutcome::Next)
            }
        }
    }
}

/// Terminal: the secure session completed.
#[derive(Debug, Default)]
pub struct ProvSpdmDoneComponent;

#[async_trait]
impl ProvisioningHandler for ProvSpdmDoneComponent {
    fn name(&self) -> &'static str {
        "ProvSpdmDoneComponent"
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        if transfer.flow_stage() != Some(FlowStage::SpdmSession) {
            return Ok(HandlerOutcome::Next);
        }
        info!("Provisioning result: OK");
        Ok(HandlerOutcome::Respond(
            ProvisioningResponseDtoBuilder::default().done(),
        ))
    }
}
