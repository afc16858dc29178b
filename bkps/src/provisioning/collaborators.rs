// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Services the provisioning flow consumes but does not own: configuration
//! storage, provisioning history and the sealing key.

use super::error::SealingKeyError;
use crate::psg::{KeyWrappingType, PsgQekBuilderHsm, StorageType};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

pub const OVERBUILD_MAX_INFINITE: i32 = -1;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PufType {
    Efuse,
    Iid,
    Intel,
    IidUser,
    IntelUser,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OverbuildConfig {
    pub max: i32,
    pub current: i32,
}

impl OverbuildConfig {
    pub fn is_infinite(&self) -> bool {
        self.max == OVERBUILD_MAX_INFINITE
    }
}

/// The customer AES key as stored: `value` is sealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AesKeyConfig {
    pub value: Vec<u8>,
    pub storage: StorageType,
    pub key_wrapping_type: KeyWrappingType,
    pub test_program: bool,
}

/// Sealed QEK and the HSM key that unwraps its root key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QekConfig {
    pub value: Vec<u8>,
    pub key_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfidentialData {
    pub aes_key: AesKeyConfig,
    pub qek: Option<QekConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfiguration {
    pub cfg_id: u64,
    pub puf_type: PufType,
    pub overbuild: OverbuildConfig,
    pub corim_url: Option<String>,
    pub confidential_data: Option<ConfidentialData>,
    pub measurements_request_signature: Option<bool>,
}

impl ServiceConfiguration {
    /// Blank URLs count as missing.
    pub fn corim_url(&self) -> Option<&str> {
        self.corim_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

pub trait ServiceConfigurationProvider: Send + Sync {
    fn get_configuration(&self, cfg_id: u64) -> Option<ServiceConfiguration>;

    /// Conditionally bumps the overbuild counter. Returns the rows updated.
    fn get_configuration_and_update(&self, cfg_id: u64) -> u32;
}

pub trait ProvisioningHistory: Send + Sync {
    fn is_provisioned(&self, device_id_hex: &str, puf_type: PufType) -> bool;

    /// Returns `true` only when this is the first marking.
    fn mark_provisioned(&self, device_id_hex: &str, puf_type: PufType) -> bool;
}

pub trait ConfidentialDataUnsealer: Send + Sync {
    /// Fails synchronously when there is no active key or a rotation is pending.
    fn unseal(&self, sealed: &[u8]) -> Result<Zeroizing<Vec<u8>>, SealingKeyError>;

    fn decrypt_qek_root_key(
        &self,
        qek: &PsgQekBuilderHsm,
        key_name: &str,
    ) -> Result<Zeroizing<Vec<u8>>, SealingKeyError>;
}
