// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use core::fmt;

/// Status word returned by every native engine call.
///
/// Layout follows libspdm's return status: bits 28-31 severity,
/// bits 16-23 source, bits 0-15 code.
/// Reference: https://github.com/DMTF/libspdm/blob/main/include/library/spdm_return_status.h
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct LibSpdmReturn(pub u32);

pub const LIBSPDM_STATUS_SUCCESS: LibSpdmReturn = LibSpdmReturn(0x0000_0000);
/// Application status: the responder does not speak SPDM.
pub const LIBSPDM_STATUS_SPDM_NOT_SUPPORTED: LibSpdmReturn = LibSpdmReturn(0x80FF_0001);
/// Application status: a callback failed inside the requester.
pub const LIBSPDM_STATUS_SPDM_INTERNAL_EXCEPTION: LibSpdmReturn = LibSpdmReturn(0x80FF_0002);

pub const LIBSPDM_SEVERITY_SUCCESS: u8 = 0x0;
pub const LIBSPDM_SEVERITY_ERROR: u8 = 0x8;

/// Builds a status from its parts the way the native library does.
pub const fn libspdm_status_construct(severity: u8, source: u8, code: u16) -> LibSpdmReturn {
    LibSpdmReturn(((severity as u32 & 0xF) << 28) | ((source as u32) << 16) | code as u32)
}

pub const LIBSPDM_STATUS_INVALID_PARAMETER: LibSpdmReturn =
    libspdm_status_construct(LIBSPDM_SEVERITY_ERROR, 0x01, 0x0001);
pub const LIBSPDM_STATUS_INVALID_STATE_LOCAL: LibSpdmReturn =
    libspdm_status_construct(LIBSPDM_SEVERITY_ERROR, 0x01, 0x0003);
pub const LIBSPDM_STATUS_ERROR_PEER: LibSpdmReturn =
    libspdm_status_construct(LIBSPDM_SEVERITY_ERROR, 0x01, 0x000A);
pub const LIBSPDM_STATUS_SEND_FAIL: LibSpdmReturn =
    libspdm_status_construct(LIBSPDM_SEVERITY_ERROR, 0x04, 0x0000);
pub const LIBSPDM_STATUS_RECEIVE_FAIL: LibSpdmReturn =
    libspdm_status_construct(LIBSPDM_SEVERITY_ERROR, 0x04, 0x0001);

impl LibSpdmReturn {
    pub fn is_success(&self) -> bool {
        self.severity() == LIBSPDM_SEVERITY_SUCCESS
    }

    pub fn is_error(&self) -> bool {
        self.severity() == LIBSPDM_SEVERITY_ERROR
    }

    pub fn severity(&self) -> u8 {
        ((self.0 & 0xF000_0000) >> 28) as u8
    }

    pub fn source(&self) -> u8 {
        ((self.0 & 0x00FF_0000) >> 16) as u8
    }

    pub fn code(&self) -> u16 {
        (self.0 & 0x0000_FFFF) as u16
    }
}

impl fmt::Display for LibSpdmReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::Debug for LibSpdmReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LibSpdmReturn(0x{:08X}, severity: {}, source: 0x{:02X}, code: 0x{:04X})",
            self.0,
            self.severity(),
            self.source(),
            self.code()
        )
    }
}
