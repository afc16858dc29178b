// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Service configuration, loaded from JSON.

use crate::spdm::params::DEFAULT_CT_EXPONENT;
use core::fmt;
use core::time::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zeroize::Zeroizing;

pub const CONTEXT_KEY_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibSpdmParams {
    pub ct_exponent: u8,
    pub measurements_request_signature: bool,
    /// How long the worker waits for the next device response.
    pub network_communication_timeout_secs: u64,
    /// How long the controller waits for the worker's next message.
    pub library_communication_timeout_secs: u64,
    pub supported_version: String,
}

impl Default for LibSpdmParams {
    fn default() -> Self {
        LibSpdmParams {
            ct_exponent: DEFAULT_CT_EXPONENT,
            measurements_request_signature: true,
            network_communication_timeout_secs: 60,
            library_communication_timeout_secs: 10,
            supported_version: "12".to_string(),
        }
    }
}

impl LibSpdmParams {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network_communication_timeout_secs)
    }

    pub fn library_timeout(&self) -> Duration {
        Duration::from_secs(self.library_communication_timeout_secs)
    }
}

/// Fixed delay, bounded attempts. No backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub delay_ms: u64,
    pub max_retries: u32,
}

impl RetryPolicy {
    pub const fn new(delay_ms: u64, max_retries: u32) -> Self {
        RetryPolicy {
            delay_ms,
            max_retries,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub ensure_not_running: RetryPolicy,
    pub ensure_not_running_long: RetryPolicy,
    pub queue: RetryPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            ensure_not_running: RetryPolicy::new(1000, 3),
            ensure_not_running_long: RetryPolicy::new(1000, 10),
            queue: RetryPolicy::new(1000, 3),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BkpsConfig {
    pub lib_spdm_params: LibSpdmParams,
    pub retry: RetryConfig,
    /// Hex of the AES-256-GCM key wrapping the provisioning context.
    pub context_encryption_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    InvalidKey(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Failed to read configuration: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Failed to parse configuration: {}", msg),
            ConfigError::InvalidKey(msg) => write!(f, "Invalid context encryption key: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl BkpsConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Decoded context key. `None` when no key is configured.
    pub fn context_key(&self) -> Result<Option<Zeroizing<Vec<u8>>>, ConfigError> {
        let encoded = match &self.context_encryption_key {
            Some(encoded) => encoded,
            None => return Ok(None),
        };
        let key = Zeroizing::new(
            hex::decode(encoded.trim()).map_err(|e| ConfigError::InvalidKey(e.to_string()))?,
        );
        if key.len() != CONTEXT_KEY_LEN {
            return Err(ConfigError::InvalidKey(format!(
                "expected {} bytes, got {}",
                CONTEXT_KEY_LEN,
                key.len()
            )));
        }
        Ok(Some(key))
    }
}
