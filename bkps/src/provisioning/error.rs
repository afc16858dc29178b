// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SealingKeyError {
    NoActiveKey,
    RotationPending,
    Unseal(String),
}

impl fmt::Display for SealingKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SealingKeyError::NoActiveKey => f.write_str("Active sealing key does not exist."),
            SealingKeyError::RotationPending => {
                f.write_str("Sealing key rotation is pending. Retry after rotation completes.")
            }
            SealingKeyError::Unseal(msg) => write!(f, "Failed to unseal data: {}", msg),
        }
    }
}

impl std::error::Error for SealingKeyError {}

/// Errors handed back across the request boundary. Low-level detail is
/// logged where it happens and folded into one of these kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningError {
    Generic(String),
    InvalidConfiguration(u64),
    CommandNotSupported(String),
    ExceededOverbuild(String),
    Converter(String),
    Encryption(String),
    SealingKey(SealingKeyError),
}

pub type ProvisioningResult<T> = core::result::Result<T, ProvisioningError>;

impl ProvisioningError {
    pub fn generic<S: Into<String>>(msg: S) -> Self {
        ProvisioningError::Generic(msg.into())
    }

    /// Converter and encryption failures reach the caller as a generic error.
    pub fn into_generic(self) -> Self {
        match self {
            ProvisioningError::Converter(msg) => ProvisioningError::Generic(msg),
            ProvisioningError::Encryption(msg) => {
                debug!("Context encryption failed: {}", msg);
                ProvisioningError::Generic("Preparing response failed.".to_string())
            }
            other => other,
        }
    }
}

impl fmt::Display for ProvisioningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProvisioningError::Generic(msg)
            | ProvisioningError::Converter(msg)
            | ProvisioningError::Encryption(msg)
            | ProvisioningError::ExceededOverbuild(msg) => f.write_str(msg),
            ProvisioningError::InvalidConfiguration(cfg_id) => {
                write!(f, "Invalid configuration for cfg id: {}", cfg_id)
            }
            ProvisioningError::CommandNotSupported(msg) => {
                write!(f, "Command not supported by programmer: {}", msg)
            }
            ProvisioningError::SealingKey(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProvisioningError {}

impl From<SealingKeyError> for ProvisioningError {
    fn from(e: SealingKeyError) -> Self {
        ProvisioningError::SealingKey(e)
    }
}
