// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::chain::{ProvisioningChain, ProvisioningHandler};
use super::collaborators::ServiceConfigurationProvider;
use super::dto::{ProvisioningRequestDto, ProvisioningResponseDto};
use super::error::ProvisioningResult;
use super::handler::{
    HandlerDependencies, ProvAdapterComponent, ProvCreateComponent, ProvDecisionComponent,
    ProvProtocolChooser, ProvQuartusStatusVerifierComponent, ProvSigmaCreateComponent,
    ProvSpdmCommunicationComponent, ProvSpdmCreateComponent, ProvSpdmDoneComponent,
    ProvSpdmGetChipIdComponent, ProvSupportedCommandsComponent,
};
use super::transfer::ProvisioningTransferObject;
use std::sync::Arc;

/// Entry point for one provisioning round trip.
pub struct ProvisioningService {
    entry: ProvisioningChain,
    configuration: Arc<dyn ServiceConfigurationProvider>,
}

impl ProvisioningService {
    /// `sigma_handlers` follow session creation in the SIGMA sub-chain.
    pub fn new(
        deps: HandlerDependencies,
        configuration: Arc<dyn ServiceConfigurationProvider>,
        sigma_handlers: Vec<Box<dyn ProvisioningHandler>>,
    ) -> ProvisioningResult<Self> {
        let spdm = ProvisioningChain::new(vec![
            Box::new(ProvSpdmGetChipIdComponent::new(deps.clone())),
            Box::new(ProvSpdmCreateComponent::new(deps.clone())),
            Box::new(ProvSpdmCommunicationComponent::new(deps.clone())),
            Box::new(ProvSpdmDoneComponent),
        ])?;

        let mut sigma: Vec<Box<dyn ProvisioningHandler>> =
            vec![Box::new(ProvSigmaCreateComponent::new(deps.clone()))];
        sigma.extend(sigma_handlers);
        let sigma = ProvisioningChain::new(sigma)?;

        let entry = ProvisioningChain::new(vec![
            Box::new(ProvSupportedCommandsComponent),
            Box::new(ProvCreateComponent::new(deps.clone())),
            Box::new(ProvAdapterComponent::new(deps.encryption_provider.clone())),
            Box::new(ProvQuartusStatusVerifierComponent),
            Box::new(ProvDecisionComponent::new(
                deps,
                ProvProtocolChooser { spdm, sigma },
            )),
        ])?;
        Ok(ProvisioningService {
            entry,
            configuration,
        })
    }

    pub async fn get_next(
        &self,
        dto: ProvisioningRequestDto,
    ) -> ProvisioningResult<ProvisioningResponseDto> {
        let api_version = dto.api_version.clone();
        let mut transfer = ProvisioningTransferObject::new(dto, self.configuration.clone());
        let mut response = self.entry.dispatch(&mut transfer).await.map_err(|e| {
            error!("Provisioning failed: {}", e);
            e
        })?;
        response.api_version = api_version;
        Ok(response)
    }
}
