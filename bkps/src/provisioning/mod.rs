// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Stateless provisioning flow. Each request walks the handler chain once;
//! everything a later request needs travels in the encrypted context.

pub mod certificate;
pub mod chain;
pub mod collaborators;
pub mod command;
pub mod context;
pub mod dto;
pub mod encryption;
pub mod error;
pub mod flow;
pub mod handler;
pub mod overbuild;
pub mod programmer;
pub mod service;
pub mod transfer;

pub use chain::{HandlerOutcome, ProvisioningChain, ProvisioningHandler};
pub use collaborators::{
    AesKeyConfig, ConfidentialData, ConfidentialDataUnsealer, OverbuildConfig, ProvisioningHistory,
    PufType, QekConfig, ServiceConfiguration, ServiceConfigurationProvider, OVERBUILD_MAX_INFINITE,
};
pub use command::{CommandIdentifier, CommandLayer, CommandLayerError};
pub use context::{EcdhKeyPair, EmptyContext, ProvContext, ProvSigmaContext, ProvSpdmContext};
pub use dto::{
    CommunicationStatus, ProvisioningRequestDto, ProvisioningRequestDtoReader,
    ProvisioningResponseDto, ProvisioningResponseDtoBuilder, ResponseDto,
};
pub use encryption::{AesGcmContextProvider, ContextEncryptionProvider};
pub use error::{ProvisioningError, ProvisioningResult, SealingKeyError};
pub use flow::{FlowStage, ProtocolType};
pub use handler::HandlerDependencies;
pub use service::ProvisioningService;
pub use transfer::ProvisioningTransferObject;
