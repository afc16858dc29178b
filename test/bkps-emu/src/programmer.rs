// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Plays the programmer tool: relays every command to the device and
//! posts the answers back with the context it was handed.

use crate::command_layer::EmuCommandLayer;
use crate::responder::EmuDevice;
use bkps::provisioning::programmer::{MessageType, ResponseStatus};
use bkps::provisioning::{
    CommandIdentifier, CommandLayer, ProvisioningError, ProvisioningRequestDto,
    ProvisioningResponseDto, ProvisioningResult, ProvisioningService, ResponseDto,
};
use bkps::worker::{SpdmBackgroundService, SpdmMessage, SpdmThreadError};
use std::sync::Arc;

pub const EMU_API_VERSION: &str = "2.0";
pub const DEFAULT_MAX_ROUNDS: usize = 64;

/// Everything the service answered during one run.
#[derive(Debug, Default)]
pub struct ProgrammerTranscript {
    pub responses: Vec<ProvisioningResponseDto>,
}

impl ProgrammerTranscript {
    pub fn rounds(&self) -> usize {
        self.responses.len()
    }

    pub fn last(&self) -> Option<&ProvisioningResponseDto> {
        self.responses.last()
    }
}

pub struct EmuProgrammer {
    device: Arc<EmuDevice>,
    cfg_id: u64,
    supported_commands: u32,
    max_rounds: usize,
}

impl EmuProgrammer {
    pub fn new(device: Arc<EmuDevice>, cfg_id: u64) -> Self {
        EmuProgrammer {
            device,
            cfg_id,
            supported_commands: MessageType::SEND_PACKET.bits(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_supported_commands(mut self, supported_commands: u32) -> Self {
        self.supported_commands = supported_commands;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn first_request(&self) -> ProvisioningRequestDto {
        ProvisioningRequestDto {
            api_version: EMU_API_VERSION.to_string(),
            cfg_id: self.cfg_id,
            context: Vec::new(),
            supported_commands: self.supported_commands,
            jtag_responses: Vec::new(),
        }
    }

    /// Runs every command of `response` on the device.
    pub fn relay(&self, response: &ProvisioningResponseDto) -> ProvisioningRequestDto {
        let jtag_responses = response
            .jtag_commands
            .iter()
            .map(|command| ResponseDto {
                value: self.device.handle(&command.value),
                status: ResponseStatus::StOk,
            })
            .collect();
        ProvisioningRequestDto {
            context: response.context.clone(),
            jtag_responses,
            ..self.first_request()
        }
    }

    /// Loops until the service reports done, fails, or `max_rounds` pass.
    pub async fn run(&self, service: &ProvisioningService) -> ProvisioningResult<ProgrammerTranscript> {
        let mut transcript = ProgrammerTranscript::default();
        let mut request = self.first_request();
        while transcript.rounds() < self.max_rounds {
            let response = service.get_next(request).await?;
            let done = response.is_done();
            request = self.relay(&response);
            transcript.responses.push(response);
            if done {
                info!("programmer: done after {} rounds", transcript.rounds());
                return Ok(transcript);
            }
        }
        Err(ProvisioningError::Generic(format!(
            "Programmer gave up after {} rounds.",
            self.max_rounds
        )))
    }

    /// Feeds a bare worker run (no handler chain) until it finishes and
    /// returns its result.
    pub async fn drive_worker(&self, service: &SpdmBackgroundService) -> Option<SpdmThreadError> {
        let layer = EmuCommandLayer;
        let mut next = service.get_message_from_queue().await.ok();
        while let Some(message) = next {
            let answer = self.device.handle(message.as_bytes());
            if layer.retrieve(&answer, CommandIdentifier::Mctp).is_err() {
                debug!("programmer: device rejected MCTP frame");
            }
            service.push_response_to_queue(SpdmMessage(answer));
            next = service.try_get_message_from_queue().await.ok().flatten();
        }
        while service.is_processing() {
            tokio::task::yield_now().await;
        }
        service.get_process_result()
    }
}
