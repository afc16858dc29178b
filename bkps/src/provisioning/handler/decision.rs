// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::{send_packet, single_response, HandlerDependencies};
use crate::provisioning::chain::{HandlerOutcome, ProvisioningChain, ProvisioningHandler};
use crate::provisioning::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::flow::{FlowStage, ProtocolType};
use crate::provisioning::transfer::ProvisioningTransferObject;
use crate::worker::{SpdmMessage, SpdmThreadError};
use async_trait::async_trait;

/// Per-protocol sub-chains.
pub struct ProvProtocolChooser {
    pub spdm: ProvisioningChain,
    pub sigma: ProvisioningChain,
}

impl ProvProtocolChooser {
    pub fn chain_for(&self, protocol_type: ProtocolType) -> &ProvisioningChain {
        match protocol_type {
            ProtocolType::Spdm => &self.spdm,
            ProtocolType::Sigma => &self.sigma,
        }
    }
}

/// Relays the VCA exchange until the worker finishes, then routes the flow to
/// SPDM when it succeeded and to SIGMA otherwise.
pub struct ProvDecisionComponent {
    deps: HandlerDependencies,
    chooser: ProvProtocolChooser,
}

impl ProvDecisionComponent {
    pub fn new(deps: HandlerDependencies, chooser: ProvProtocolChooser) -> Self {
        ProvDecisionComponent { deps, chooser }
    }

    async fn run_protocol(
        &self,
        protocol_type: ProtocolType,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        debug!("Choosing protocol service by protocol type: {:?}", protocol_type);
        transfer.protocol_type = Some(protocol_type);
        self.chooser
            .chain_for(protocol_type)
            .dispatch(transfer)
            .await
            .map(HandlerOutcome::Respond)
    }

    fn build_response(&self, message: SpdmMessage) -> ProvisioningResult<HandlerOutcome> {
        self.deps
            .response_builder()
            .with_messages(send_packet(message))
            .flow_stage(FlowStage::ProtocolDecision)
            .build()
            .map(HandlerOutcome::Respond)
            .map_err(ProvisioningError::into_generic)
    }

    async fn determine_protocol(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        if transfer.flow_stage() != Some(FlowStage::ProtocolDecision) {
            return Err(ProvisioningError::generic(
                "ProtocolType could not be determined.",
            ));
        }

        let response = single_response(transfer.dto_reader()?.jtag_responses())?.to_vec();
        self.deps.ensure_service_is_processing()?;
        self.deps
            .spdm_service
            .push_response_to_queue(SpdmMessage(response));

        match self.deps.next_message_from_worker().await? {
            Some(message) => self.build_response(message),
            None => {
                let result = self
                    .deps
                    .spdm_service
                    .get_process_result()
                    .unwrap_or(SpdmThreadError::Failure);
                debug!("SPDM Service - process result: {}", result);
                if result.is_success() {
                    debug!("SPDM VCA returned success.");
                    self.run_protocol(ProtocolType::Spdm, transfer).await
                } else {
                    debug!("SPDM VCA failed.");
                    self.run_protocol(ProtocolType::Sigma, transfer).await
                }
            }
        }
    }
}

#[async_trait]
impl ProvisioningHandler for ProvDecisionComponent {
    fn name(&self) -> &'static str {
        "ProvDecisionComponent"
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        match transfer.protocol_type {
            Some(protocol_type) => self.run_protocol(protocol_type, transfer).await,
            None => self.determine_protocol(transfer).await,
        }
    }
}
