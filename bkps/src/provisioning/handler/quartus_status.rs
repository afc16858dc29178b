// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use crate::provisioning::chain::{HandlerOutcome, ProvisioningHandler};
use crate::provisioning::error::{ProvisioningError, ProvisioningResult};
use crate::provisioning::transfer::ProvisioningTransferObject;
use async_trait::async_trait;

#[derive(Debug, Default)]
pub struct ProvQuartusStatusVerifierComponent;

#[async_trait]
impl ProvisioningHandler for ProvQuartusStatusVerifierComponent {
    fn name(&self) -> &'static str {
        "ProvQuartusStatusVerifierComponent"
    }

    async fn handle(
        &self,
        transfer: &mut ProvisioningTransferObject,
    ) -> ProvisioningResult<HandlerOutcome> {
        let reader = transfer.dto_reader()?;
        if let Some(failed) = reader.jtag_responses().iter().find(|r| !r.is_ok()) {
            error!("Quartus response status: {:?}", failed.status);
            return Err(ProvisioningError::generic(
                "Quartus responses contain an error status.",
            ));
        }
        Ok(HandlerOutcome::Next)
    }
}
