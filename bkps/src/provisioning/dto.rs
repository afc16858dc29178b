// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Request and response bodies exchanged with the programmer client.

use super::context::{base64_bytes, ProvContext, ProvContextWithFlow, ProvisioningContextConverter};
use super::encryption::{ContextEncryptionProvider, PROVIDER_NOT_INITIALIZED};
use super::error::{ProvisioningError, ProvisioningResult};
use super::flow::{FlowStage, ProtocolType};
use super::programmer::{MessageType, ProgrammerMessage, ProgrammerResponse, ResponseStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDto {
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
    #[serde(default)]
    pub status: ResponseStatus,
}

impl From<&ResponseDto> for ProgrammerResponse {
    fn from(dto: &ResponseDto) -> Self {
        ProgrammerResponse {
            value: dto.value.clone(),
            status: dto.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageDto {
    pub message_type: u32,
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
}

impl From<&ProgrammerMessage> for MessageDto {
    fn from(message: &ProgrammerMessage) -> Self {
        MessageDto {
            message_type: message.message_type.bits(),
            value: message.value.clone(),
        }
    }
}

impl MessageDto {
    pub fn message_type(&self) -> MessageType {
        MessageType::from_bits_truncate(self.message_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisioningRequestDto {
    pub api_version: String,
    pub cfg_id: u64,
    #[serde(with = "base64_bytes")]
    pub context: Vec<u8>,
    pub supported_commands: u32,
    pub jtag_responses: Vec<ResponseDto>,
}

impl ProvisioningRequestDto {
    pub fn is_context_empty(&self) -> bool {
        self.context.is_empty()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommunicationStatus {
    Continue,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisioningResponseDto {
    #[serde(default)]
    pub api_version: String,
    #[serde(with = "base64_bytes")]
    pub context: Vec<u8>,
    pub status: CommunicationStatus,
    pub jtag_commands: Vec<MessageDto>,
}

impl ProvisioningResponseDto {
    pub fn is_done(&self) -> bool {
        self.status == CommunicationStatus::Done
    }
}

#[derive(Default)]
pub struct ProvisioningResponseDtoBuilder<'a> {
    context: Option<ProvisioningResult<Vec<u8>>>,
    jtag_commands: Vec<ProgrammerMessage>,
    encryption_provider: Option<&'a dyn ContextEncryptionProvider>,
    flow_stage: Option<FlowStage>,
    protocol_type: Option<ProtocolType>,
}

impl<'a> ProvisioningResponseDtoBuilder<'a> {
    pub fn context<C: ProvContext>(mut self, context: &C) -> Self {
        self.context = Some(ProvisioningContextConverter::serialize(context));
        self
    }

    pub fn with_messages(mut self, jtag_commands: Vec<ProgrammerMessage>) -> Self {
        self.jtag_commands = jtag_commands;
        self
    }

    pub fn flow_stage(mut self, flow_stage: FlowStage) -> Self {
        self.flow_stage = Some(flow_stage);
        self
    }

    pub fn protocol_type(mut self, protocol_type: Option<ProtocolType>) -> Self {
        self.protocol_type = protocol_type;
        self
    }

    pub fn encryption_provider(
        mut self,
        encryption_provider: Option<&'a dyn ContextEncryptionProvider>,
    ) -> Self {
        self.encryption_provider = encryption_provider;
        self
    }

    pub fn build(self) -> ProvisioningResult<ProvisioningResponseDto> {
        let provider = self
            .encryption_provider
            .ok_or_else(|| ProvisioningError::Encryption(PROVIDER_NOT_INITIALIZED.to_string()))?;
        let context_data = match self.context {
            Some(serialized) => serialized?,
            None => Vec::new(),
        };
        let envelope = ProvContextWithFlow {
            flow_stage: self.flow_stage,
            protocol_type: self.protocol_type,
            context_data,
        };
        let serialized = ProvisioningContextConverter::serialize(&envelope)?;
        Ok(ProvisioningResponseDto {
            api_version: String::new(),
            context: provider.encrypt(&serialized)?,
            status: CommunicationStatus::Continue,
            jtag_commands: self.jtag_commands.iter().map(MessageDto::from).collect(),
        })
    }

    /// Terminal response: no context, flow complete.
    pub fn done(self) -> ProvisioningResponseDto {
        ProvisioningResponseDto {
            api_version: String::new(),
            context: Vec::new(),
            status: CommunicationStatus::Done,
            jtag_commands: self.jtag_commands.iter().map(MessageDto::from).collect(),
        }
    }
}

/// Decrypted view of an inbound request.
#[derive(Debug, Clone)]
pub struct ProvisioningRequestDtoReader {
    flow_stage: Option<FlowStage>,
    protocol_type: Option<ProtocolType>,
    context_data: Vec<u8>,
    cfg_id: u64,
    jtag_responses: Vec<ProgrammerResponse>,
}

impl ProvisioningRequestDtoReader {
    pub fn new(
        dto: &ProvisioningRequestDto,
        encryption_provider: Option<&dyn ContextEncryptionProvider>,
    ) -> ProvisioningResult<Self> {
        let envelope = if dto.is_context_empty() {
            ProvContextWithFlow::default()
        } else {
            let provider = encryption_provider.ok_or_else(|| {
                ProvisioningError::Encryption(PROVIDER_NOT_INITIALIZED.to_string())
            })?;
            let decrypted = provider.decrypt(&dto.context)?;
            ProvisioningContextConverter::deserialize::<ProvContextWithFlow>(&decrypted)?
        };
        match envelope.flow_stage {
            Some(stage) => info!("FLOW STAGE: {}", stage),
            None => info!("FLOW STAGE: none"),
        }
        Ok(ProvisioningRequestDtoReader {
            flow_stage: envelope.flow_stage,
            protocol_type: envelope.protocol_type,
            context_data: envelope.context_data,
            cfg_id: dto.cfg_id,
            jtag_responses: dto.jtag_responses.iter().map(ProgrammerResponse::from).collect(),
        })
    }

    pub fn flow_stage(&self) -> Option<FlowStage> {
        self.flow_stage
    }

    pub fn protocol_type(&self) -> Option<ProtocolType> {
        self.protocol_type
    }

    pub fn cfg_id(&self) -> u64 {
        self.cfg_id
    }

    pub fn jtag_responses(&self) -> &[ProgrammerResponse] {
        &self.jtag_responses
    }

    pub fn read<C: ProvContext>(&self) -> ProvisioningResult<C> {
        ProvisioningContextConverter::deserialize(&self.context_data)
    }
}
