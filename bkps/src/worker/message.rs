// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use core::fmt;

/// One framed SPDM message travelling between the worker and the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdmMessage(pub Vec<u8>);

impl SpdmMessage {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }
}

/// Terminal outcome of one worker run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpdmThreadError {
    Success,
    Failure,
    AttestationFailed,
    UnsupportedCap,
}

impl SpdmThreadError {
    pub fn is_success(&self) -> bool {
        *self == SpdmThreadError::Success
    }
}

impl fmt::Display for SpdmThreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpdmThreadError::Success => "SUCCESS",
            SpdmThreadError::Failure => "FAILURE",
            SpdmThreadError::AttestationFailed => "ATTESTATION_FAILED",
            SpdmThreadError::UnsupportedCap => "UNSUPPORTED_CAP",
        };
        f.write_str(name)
    }
}
