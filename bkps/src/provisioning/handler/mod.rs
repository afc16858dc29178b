// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! One handler per flow stage, plus the structural handlers in front.

mod adapter;
mod create;
mod decision;
mod quartus_status;
mod sigma;
mod spdm;
mod supported_commands;

pub use adapter::ProvAdapterComponent;
pub use create::ProvCreateComponent;
pub use decision::{ProvDecisionComponent, ProvProtocolChooser};
pub use quartus_status::ProvQuartusStatusVerifierComponent;
pub use sigma::ProvSigmaCreateComponent;
pub use spdm::{
    ProvSpdmCommunicationComponent, ProvSpdmCreateComponent, ProvSpdmDoneComponent,
    ProvSpdmGetChipIdComponent,
};
pub use supported_commands::ProvSupportedCommandsComponent;

use super::collaborators::ProvisioningHistory;
use super::command::CommandLayer;
use super::dto::ProvisioningResponseDtoBuilder;
use super::encryption::ContextEncryptionProvider;
use super::error::{ProvisioningError, ProvisioningResult};
use super::programmer::{
    verify_number_of_responses, ProgrammerMessage, ProgrammerResponse,
    ProgrammerResponseToDataAdapter,
};
use crate::config::RetryPolicy;
use crate::worker::{retry_fixed, SpdmBackgroundService, SpdmMessage, WorkerError};
use std::sync::Arc;

/// One device round trip carries exactly one programmer response.
const EXPECTED_NUMBER_OF_RESPONSES: usize = 1;

/// Shared collaborators handed to every handler.
#[derive(Clone)]
pub struct HandlerDependencies {
    pub spdm_service: Arc<SpdmBackgroundService>,
    pub encryption_provider: Option<Arc<dyn ContextEncryptionProvider>>,
    pub command_layer: Arc<dyn CommandLayer>,
    pub history: Arc<dyn ProvisioningHistory>,
}

impl HandlerDependencies {
    fn response_builder(&self) -> ProvisioningResponseDtoBuilder<'_> {
        ProvisioningResponseDtoBuilder::default()
            .encryption_provider(self.encryption_provider.as_deref())
    }

    /// Waits out the teardown of a previous flow's worker.
    async fn ensure_process_is_not_running(&self, policy: RetryPolicy) -> ProvisioningResult<()> {
        let service = self.spdm_service.as_ref();
        retry_fixed(policy, WorkerError::is_retryable, || async move {
            service.ensure_process_is_not_running()
        })
        .await
        .map_err(ProvisioningError::from)
    }

    fn ensure_service_is_processing(&self) -> ProvisioningResult<()> {
        if !self.spdm_service.is_processing() {
            return Err(ProvisioningError::generic("SPDM Service is not working."));
        }
        Ok(())
    }

    async fn first_message_from_worker(&self) -> ProvisioningResult<SpdmMessage> {
        self.spdm_service
            .get_message_from_queue()
            .await
            .map_err(|_| ProvisioningError::generic("No response from SPDM Service."))
    }

    async fn next_message_from_worker(&self) -> ProvisioningResult<Option<SpdmMessage>> {
        self.spdm_service
            .try_get_message_from_queue()
            .await
            .map_err(|_| ProvisioningError::generic("SPDM Service failed to complete gracefully."))
    }
}

/// The single programmer response of this round trip.
fn single_response(responses: &[ProgrammerResponse]) -> ProvisioningResult<&[u8]> {
    info!("parsing quartus responses...");
    verify_number_of_responses(responses, EXPECTED_NUMBER_OF_RESPONSES)?;
    ProgrammerResponseToDataAdapter::new(responses).get_next()
}

fn send_packet(message: SpdmMessage) -> Vec<ProgrammerMessage> {
    vec![ProgrammerMessage::send_packet(message.into_inner())]
}
