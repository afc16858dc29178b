// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::error::{SpdmError, SpdmResult};

#[derive(Debug, Clone)]
pub struct SpdmVersionVerifier {
    supported_version: u8,
}

fn parse_version(version: &str) -> SpdmResult<u8> {
    if version.is_empty() {
        return Err(SpdmError::InvalidVersion(format!(
            "Invalid SPDM version: {}",
            version
        )));
    }
    u8::from_str_radix(version, 16)
        .map_err(|_| SpdmError::InvalidVersion(format!("Invalid SPDM version: {}", version)))
}

impl SpdmVersionVerifier {
    pub fn new(supported_version: &str) -> SpdmResult<Self> {
        Ok(SpdmVersionVerifier {
            supported_version: parse_version(supported_version)?,
        })
    }

    pub fn ensure_version_is_supported(&self, responder_version: &str) -> SpdmResult {
        let version = parse_version(responder_version)?;
        if version != self.supported_version {
            error!(
                "Responder SPDM version {} is not supported",
                responder_version
            );
            return Err(SpdmError::UnsupportedVersion(format!(
                "Responder SPDM version: {}, supported version: {:02X}",
                responder_version, self.supported_version
            )));
        }
        Ok(())
    }
}
