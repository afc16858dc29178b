// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! The customer AES key pushed to the device inside the SPDM session.

use super::collaborators::{ConfidentialDataUnsealer, ServiceConfiguration};
use super::command::{CommandIdentifier, CommandLayer};
use super::error::{ProvisioningError, ProvisioningResult};
use crate::psg::endianness::{put_word, read_word};
use crate::psg::{EndiannessActor, PsgAesKeyBuilder, PsgAesKeyBuilderFactory, PsgAesKeyType, PsgQekBuilderHsm};
use codec::{Reader, Writer};
use zeroize::Zeroizing;

const AES_KEY_PARSE_FAILED: &str = "Failed to get AES Key SDM version or parse Customer AES Key.";

/// Mailbox body of CERTIFICATE and USER_AES_ROOT_KEY_PROVISION.
pub struct CertificateMessage<'a> {
    pub test_program: bool,
    pub aes_key: &'a [u8],
}

impl<'a> CertificateMessage<'a> {
    pub fn build(&self) -> Zeroizing<Vec<u8>> {
        let mut w = Writer::with_capacity(4 + self.aes_key.len());
        put_word(&mut w, self.test_program as u32, EndiannessActor::Firmware);
        w.extend_from_slice(self.aes_key);
        Zeroizing::new(w.into_vec())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CertificateResponse {
    pub status: u32,
}

impl CertificateResponse {
    pub fn parse(bytes: &[u8]) -> ProvisioningResult<Self> {
        let r = &mut Reader::init(bytes);
        let status = read_word(r, EndiannessActor::Firmware).map_err(|e| {
            error!("CERTIFICATE response too short: {}", e);
            ProvisioningError::Generic(format!("Invalid CERTIFICATE response: {}", e))
        })?;
        Ok(CertificateResponse { status })
    }

    pub fn process_completed(&self) -> bool {
        self.status == 0
    }
}

/// Ready-to-send certificate command and which mailbox command it is.
#[derive(Debug)]
pub struct CertificatePayload {
    pub command: CommandIdentifier,
    pub payload: Zeroizing<Vec<u8>>,
}

pub struct CertificatePayloadBuilder<'a> {
    unsealer: &'a dyn ConfidentialDataUnsealer,
    command_layer: &'a dyn CommandLayer,
}

impl<'a> CertificatePayloadBuilder<'a> {
    pub fn new(
        unsealer: &'a dyn ConfidentialDataUnsealer,
        command_layer: &'a dyn CommandLayer,
    ) -> Self {
        CertificatePayloadBuilder {
            unsealer,
            command_layer,
        }
    }

    pub fn prepare_from(
        &self,
        configuration: &ServiceConfiguration,
    ) -> ProvisioningResult<CertificatePayload> {
        let confidential_data = configuration
            .confidential_data
            .as_ref()
            .ok_or(ProvisioningError::InvalidConfiguration(configuration.cfg_id))?;
        let aes_key_config = &confidential_data.aes_key;

        let aes_key = self.unsealer.unseal(&aes_key_config.value)?;
        let builder = parse_aes_key(&aes_key)?;
        debug!("Customer AES key version: {:?}", builder.aes_key_type());

        let (command, key_bytes) = match builder.aes_key_type() {
            PsgAesKeyType::Sdm15 => {
                let qek_config = confidential_data.qek.as_ref().ok_or_else(|| {
                    error!("SDM 1.5 AES key requires a QEK in configuration.");
                    ProvisioningError::InvalidConfiguration(configuration.cfg_id)
                })?;
                let qek_bytes = self.unsealer.unseal(&qek_config.value)?;
                let qek = PsgQekBuilderHsm::default()
                    .parse(&qek_bytes)
                    .map_err(|e| {
                        error!("Failed to parse QEK: {}", e);
                        ProvisioningError::generic("Failed to parse QEK.")
                    })?;
                let root_key = self
                    .unsealer
                    .decrypt_qek_root_key(&qek, &qek_config.key_name)?;
                let mut bytes = Zeroizing::new(aes_key.to_vec());
                bytes.extend_from_slice(&root_key);
                (CommandIdentifier::UserAesRootKeyProvision, bytes)
            }
            PsgAesKeyType::Sdm12 => (CommandIdentifier::Certificate, aes_key),
        };

        let message = CertificateMessage {
            test_program: aes_key_config.test_program,
            aes_key: &key_bytes,
        }
        .build();
        Ok(CertificatePayload {
            command,
            payload: Zeroizing::new(self.command_layer.create(&message, command)),
        })
    }
}

fn parse_aes_key(bytes: &[u8]) -> ProvisioningResult<PsgAesKeyBuilder> {
    PsgAesKeyBuilderFactory::default()
        .get_psg_aes_key_builder(bytes)
        .and_then(|builder| builder.parse(bytes))
        .map_err(|e| {
            error!("{}: {}", AES_KEY_PARSE_FAILED, e);
            ProvisioningError::generic(AES_KEY_PARSE_FAILED)
        })
}
