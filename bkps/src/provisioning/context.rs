// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! In-flight provisioning state, flattened into the opaque blob that travels
//! with every request and response.

use super::error::{ProvisioningError, ProvisioningResult};
use super::flow::{FlowStage, ProtocolType};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

const FAILED_TO_SERIALIZE_CONTEXT: &str = "Failed to serialize Provisioning Context.";
const FAILED_TO_DESERIALIZE_CONTEXT: &str = "Failed to deserialize Provisioning Context.";

/// Byte fields as standard base64 strings.
pub(crate) mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.as_bytes()).map_err(serde::de::Error::custom)
    }
}

/// Marker for records that can ride in the context envelope.
pub trait ProvContext: Serialize + DeserializeOwned {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyContext {}

impl ProvContext for EmptyContext {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvSpdmContext {
    pub device_id_hex: String,
    pub cfg_id: u64,
}

impl ProvContext for ProvSpdmContext {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct EcdhKeyPair {
    #[serde(with = "base64_bytes")]
    pub public_key: Vec<u8>,
    #[serde(with = "base64_bytes")]
    pub private_key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvSigmaContext {
    pub cfg_id: u64,
    pub chip_id: String,
    pub ecdh_key_pair: EcdhKeyPair,
    /// Hex of the enrollment certificate, `""` when the device has none.
    #[serde(default)]
    pub device_id_enrollment_cert: String,
}

impl ProvContext for ProvSigmaContext {}

impl ProvSigmaContext {
    pub fn with_enrollment_cert(mut self, cert_hex: String) -> Self {
        self.device_id_enrollment_cert = cert_hex;
        self
    }

    pub fn has_enrollment_cert(&self) -> bool {
        !self.device_id_enrollment_cert.is_empty()
    }
}

/// The envelope: stage, protocol and the serialized per-protocol context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvContextWithFlow {
    pub flow_stage: Option<FlowStage>,
    pub protocol_type: Option<ProtocolType>,
    #[serde(with = "base64_bytes", default)]
    pub context_data: Vec<u8>,
}

/// Flattens contexts to bytes and back. It never encrypts.
pub struct ProvisioningContextConverter;

impl ProvisioningContextConverter {
    pub fn serialize<T: Serialize>(value: &T) -> ProvisioningResult<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| {
            error!("{}: {}", FAILED_TO_SERIALIZE_CONTEXT, e);
            ProvisioningError::Converter(FAILED_TO_SERIALIZE_CONTEXT.to_string())
        })
    }

    pub fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> ProvisioningResult<T> {
        serde_json::from_slice(bytes).map_err(|e| {
            error!("{}: {}", FAILED_TO_DESERIALIZE_CONTEXT, e);
            ProvisioningError::Converter(FAILED_TO_DESERIALIZE_CONTEXT.to_string())
        })
    }
}
