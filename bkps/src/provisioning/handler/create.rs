// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::{send_packet, HandlerDependencies};
use crate::provisioning::chain::{HandlerOutcome, ProvisioningHandler};
use crate::provisioning::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::flow::FlowStage;
use crate::provisioning::transfer::ProvisioningTransferObject;
use async_trait::async_trait;

/// Opens a flow: starts the VCA exchange that decides between SPDM and SIGMA.
pub struct ProvCreateComponent {
    deps: HandlerDependencies,
}

impl ProvCreateComponent {
    pub fn new(deps: HandlerDependencies) -> Self {
        ProvCreateComponent { deps }
    }
}

#[async_trait]
impl ProvisioningHandler for ProvCreateComponent {
    fn name(&self) -> &'static str {
        "ProvCreateComponent"
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        if !transfer.dto().is_context_empty() {
            return Ok(HandlerOutcome::Next);
        }
        info!("create session.");

        let policy = self.deps.spdm_service.retry_config().ensure_not_running_long;
        self.deps.ensure_process_is_not_running(policy).await?;
        self.deps.spdm_service.start_vca_for_provisioning();
        let message = self.deps.first_message_from_worker().await?;

        self.deps
            .response_builder()
            .with_messages(send_packet(message))
            .flow_stage(FlowStage::ProtocolDecision)
            .build()
            .map(HandlerOutcome::Respond)
            .map_err(ProvisioningError::into_generic)
    }
}
