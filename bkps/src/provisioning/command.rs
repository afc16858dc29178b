// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Device mailbox framing and the plain-text commands sent outside SPDM.

use super::error::{ProvisioningError, ProvisioningResult};
use super::programmer::ProgrammerMessage;
use codec::Reader;
use core::fmt;

pub const CHIP_ID_LEN: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CommandIdentifier {
    Mctp,
    GetChipId,
    Certificate,
    UserAesRootKeyProvision,
    VolatileAesErase,
    SigmaTeardown,
    GetAttestationCertificate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLayerError {
    /// The device firmware does not know the command.
    UnknownCommand(CommandIdentifier),
    InvalidResponse(String),
}

impl fmt::Display for CommandLayerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandLayerError::UnknownCommand(command) => {
                write!(f, "Device responded with unknown command for {:?}", command)
            }
            CommandLayerError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
        }
    }
}

impl std::error::Error for CommandLayerError {}

impl From<CommandLayerError> for ProvisioningError {
    fn from(e: CommandLayerError) -> Self {
        ProvisioningError::Generic(e.to_string())
    }
}

/// Wraps payloads into device mailbox commands and unwraps the answers.
pub trait CommandLayer: Send + Sync {
    fn create(&self, payload: &[u8], command: CommandIdentifier) -> Vec<u8>;

    fn retrieve(
        &self,
        response: &[u8],
        command: CommandIdentifier,
    ) -> Result<Vec<u8>, CommandLayerError>;
}

pub struct GetChipIdMessageSender<'a> {
    command_layer: &'a dyn CommandLayer,
}

impl<'a> GetChipIdMessageSender<'a> {
    pub fn new(command_layer: &'a dyn CommandLayer) -> Self {
        GetChipIdMessageSender { command_layer }
    }

    pub fn create(&self) -> ProgrammerMessage {
        debug!("Preparing GET_CHIPID ...");
        ProgrammerMessage::send_packet(
            self.command_layer
                .create(&[], CommandIdentifier::GetChipId),
        )
    }

    /// Chip id as lower case hex.
    pub fn retrieve(&self, response: &[u8]) -> ProvisioningResult<String> {
        let payload = self
            .command_layer
            .retrieve(response, CommandIdentifier::GetChipId)?;
        let r = &mut Reader::init(&payload);
        let chip_id = r.take(CHIP_ID_LEN).map_err(|e| {
            error!("GET_CHIPID response too short: {}", e);
            ProvisioningError::Generic(format!("Invalid GET_CHIPID response: {}", e))
        })?;
        Ok(hex::encode(chip_id))
    }
}

pub struct SigmaTeardownMessageSender<'a> {
    command_layer: &'a dyn CommandLayer,
}

/// Tear down every SIGMA session on the device.
const SIGMA_TEARDOWN_ALL_SESSIONS: u32 = 0xFFFF_FFFF;

impl<'a> SigmaTeardownMessageSender<'a> {
    pub fn new(command_layer: &'a dyn CommandLayer) -> Self {
        SigmaTeardownMessageSender { command_layer }
    }

    pub fn create(&self) -> ProgrammerMessage {
        debug!("Preparing SIGMA_TEARDOWN ...");
        ProgrammerMessage::send_packet(self.command_layer.create(
            &SIGMA_TEARDOWN_ALL_SESSIONS.to_le_bytes(),
            CommandIdentifier::SigmaTeardown,
        ))
    }
}

/// Device id enrollment certificate type.
const CERTIFICATE_TYPE_DEVICE_ID_ENROLLMENT: u32 = 0x04;

pub struct GetAttestationCertificateMessageSender<'a> {
    command_layer: &'a dyn CommandLayer,
}

impl<'a> GetAttestationCertificateMessageSender<'a> {
    pub fn new(command_layer: &'a dyn CommandLayer) -> Self {
        GetAttestationCertificateMessageSender { command_layer }
    }

    pub fn create(&self) -> ProgrammerMessage {
        debug!("Preparing GET_ATTESTATION_CERTIFICATE ...");
        ProgrammerMessage::send_packet(self.command_layer.create(
            &CERTIFICATE_TYPE_DEVICE_ID_ENROLLMENT.to_le_bytes(),
            CommandIdentifier::GetAttestationCertificate,
        ))
    }

    /// Devices without the command yield `None`.
    pub fn retrieve(&self, response: &[u8]) -> ProvisioningResult<Option<Vec<u8>>> {
        match self
            .command_layer
            .retrieve(response, CommandIdentifier::GetAttestationCertificate)
        {
            Ok(blob) => Ok(Some(blob)),
            Err(CommandLayerError::UnknownCommand(_)) => {
                warn!("Retrieving certificate failed, device does not support the command.");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}
