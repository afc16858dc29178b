// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::HandlerDependencies;
use crate::provisioning::chain::{HandlerOutcome, ProvisioningHandler};
use crate::provisioning::command::{
    GetAttestationCertificateMessageSender, GetChipIdMessageSender, SigmaTeardownMessageSender,
};
use crate::provisioning::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::flow::FlowStage;
use crate::provisioning::transfer::ProvisioningTransferObject;
use async_trait::async_trait;

/// First SIGMA round trip: clear stale sessions and collect device identity.
pub struct ProvSigmaCreateComponent {
    deps: HandlerDependencies,
}

impl ProvSigmaCreateComponent {
    pub fn new(deps: HandlerDependencies) -> Self {
        ProvSigmaCreateComponent { deps }
    }
}

#[async_trait]
impl ProvisioningHandler for ProvSigmaCreateComponent {
    fn name(&self) -> &'static str {
        "ProvSigmaCreateComponent"
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
        info!("prepare SIGMA session.");
        let command_layer = self.deps.command_layer.as_ref();
        let messages = vec![
            SigmaTeardownMessageSender::new(command_layer).create(),
            GetChipIdMessageSender::new(command_layer).create(),
            GetAttestationCertificateMessageSender::new(command_layer).create(),
        ];
        self.deps
            .response_builder()
            .with_messages(messages)
            .flow_stage(FlowStage::SigmaCreateSession)
            .protocol_type(transfer.protocol_type)
            .build()
            .map(HandlerOutcome::Respond)
            .map_err(ProvisioningError::into_generic)
    }
}
