// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::status::{
    LibSpdmReturn, LIBSPDM_STATUS_SPDM_INTERNAL_EXCEPTION, LIBSPDM_STATUS_SPDM_NOT_SUPPORTED,
};
use core::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpdmError {
    /// The native engine could not be linked. Never retried.
    LibraryLink(String),
    ConnectionNotInitialized,
    SecureSessionNotInitialized,
    /// The responder does not speak SPDM; callers may fall back to SIGMA.
    NotSupported,
    UnsupportedVersion(String),
    InvalidVersion(String),
    UnsupportedCapability(String),
    CommandFailed(LibSpdmReturn),
    Runtime(String),
    AttestationFailed(String),
    ValidChainNotFound,
}

pub type SpdmResult<T = ()> = core::result::Result<T, SpdmError>;

impl SpdmError {
    /// Attestation outcomes are reported separately from plain failures.
    pub fn is_attestation(&self) -> bool {
        matches!(
            self,
            SpdmError::AttestationFailed(_) | SpdmError::ValidChainNotFound
        )
    }
}

impl fmt::Display for SpdmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpdmError::LibraryLink(msg) => write!(f, "Failed to link SPDM library: {}", msg),
            SpdmError::ConnectionNotInitialized => f.write_str("SPDM connection not initialized."),
            SpdmError::SecureSessionNotInitialized => {
                f.write_str("SPDM secure session not initialized.")
            }
            SpdmError::NotSupported => f.write_str("SPDM is not supported by the responder."),
            SpdmError::UnsupportedVersion(msg)
            | SpdmError::InvalidVersion(msg)
            | SpdmError::UnsupportedCapability(msg)
            | SpdmError::Runtime(msg)
            | SpdmError::AttestationFailed(msg) => f.write_str(msg),
            SpdmError::CommandFailed(status) => {
                write!(f, "SPDM command failed with status: {}", status)
            }
            SpdmError::ValidChainNotFound => {
                f.write_str("Valid certificate chain not found in any slot.")
            }
        }
    }
}

impl std::error::Error for SpdmError {}

/// Maps a native status to the three failure classes callers act on.
pub fn throw_on_error(status: LibSpdmReturn) -> SpdmResult {
    if status == LIBSPDM_STATUS_SPDM_NOT_SUPPORTED {
        return Err(SpdmError::NotSupported);
    }
    if status == LIBSPDM_STATUS_SPDM_INTERNAL_EXCEPTION {
        return Err(SpdmError::Runtime(format!(
            "SPDM exception due to internal error with status: {}",
            status
        )));
    }
    if !status.is_success() {
        return Err(SpdmError::CommandFailed(status));
    }
    Ok(())
}

/// `?`-friendly form of [`throw_on_error`] for engine results.
pub fn check<T>(res: Result<T, LibSpdmReturn>) -> SpdmResult<T> {
    match res {
        Ok(v) => Ok(v),
        Err(status) => throw_on_error(status).and(Err(SpdmError::CommandFailed(status))),
    }
}
