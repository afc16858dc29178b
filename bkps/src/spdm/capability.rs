// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

bitflags! {
    #[derive(Default)]
    pub struct SpdmRequestCapabilityFlags: u32 {
        const CERT_CAP = 0b0000_0010;
        const CHAL_CAP = 0b0000_0100;
        const ENCRYPT_CAP = 0b0100_0000;
        const MAC_CAP = 0b1000_0000;
        const MUT_AUTH_CAP = 0b0000_0001_0000_0000;
        const KEY_EX_CAP = 0b0000_0010_0000_0000;
        const PSK_CAP_REQUESTER = 0b0000_0100_0000_0000;
        const PSK_CAP = Self::PSK_CAP_REQUESTER.bits | 0b0000_1000_0000_0000;
        const ENCAP_CAP = 0b0001_0000_0000_0000;
        const HBEAT_CAP = 0b0010_0000_0000_0000;
        const KEY_UPD_CAP = 0b0100_0000_0000_0000;
        const HANDSHAKE_IN_THE_CLEAR_CAP = 0b1000_0000_0000_0000;
        const PUB_KEY_ID_CAP = 0b0000_0001_0000_0000_0000_0000;
        const CHUNK_CAP = 0b0000_0010_0000_0000_0000_0000;
    }
}

impl SpdmRequestCapabilityFlags {
    /// What the provisioning service advertises to the device.
    pub fn provisioning() -> Self {
        SpdmRequestCapabilityFlags::CERT_CAP
            | SpdmRequestCapabilityFlags::CHAL_CAP
            | SpdmRequestCapabilityFlags::ENCRYPT_CAP
            | SpdmRequestCapabilityFlags::MAC_CAP
            | SpdmRequestCapabilityFlags::KEY_EX_CAP
            | SpdmRequestCapabilityFlags::HBEAT_CAP
            | SpdmRequestCapabilityFlags::KEY_UPD_CAP
            | SpdmRequestCapabilityFlags::MUT_AUTH_CAP
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmResponseCapabilityFlags: u32 {
        const CACHE_CAP = 0b0000_0001;
        const CERT_CAP = 0b0000_0010;
        const CHAL_CAP = 0b0000_0100;
        const MEAS_CAP_NO_SIG = 0b0000_1000;
        const MEAS_CAP_SIG = 0b0001_0000;
        const MEAS_FRESH_CAP = 0b0010_0000;
        const ENCRYPT_CAP = 0b0100_0000;
        const MAC_CAP = 0b1000_0000;
        const MUT_AUTH_CAP = 0b0000_0001_0000_0000;
        const KEY_EX_CAP = 0b0000_0010_0000_0000;
        const PSK_CAP_WITHOUT_CONTEXT = 0b0000_0100_0000_0000;
        const PSK_CAP_WITH_CONTEXT = 0b0000_1000_0000_0000;
        const ENCAP_CAP = 0b0001_0000_0000_0000;
        const HBEAT_CAP = 0b0010_0000_0000_0000;
        const KEY_UPD_CAP = 0b0100_0000_0000_0000;
        const HANDSHAKE_IN_THE_CLEAR_CAP = 0b1000_0000_0000_0000;
        const PUB_KEY_ID_CAP = 0b0000_0001_0000_0000_0000_0000;
        const CHUNK_CAP = 0b0000_0010_0000_0000_0000_0000;
        const ALIAS_CERT_CAP = 0b0000_0100_0000_0000_0000_0000;
        const SET_CERT_CAP = 0b0000_1000_0000_0000_0000_0000;
    }
}

bitflags! {
    #[derive(Default)]
    pub struct SpdmMeasurementAttributes: u8 {
        const SIGNATURE_REQUESTED = 0b0000_0001;
        const RAW_BIT_STREAM_REQUESTED = 0b0000_0010;
    }
}

impl SpdmMeasurementAttributes {
    pub fn for_signature(signature_required: bool) -> Self {
        if signature_required {
            SpdmMeasurementAttributes::SIGNATURE_REQUESTED
        } else {
            SpdmMeasurementAttributes::empty()
        }
    }
}

pub const SPDM_MEASUREMENT_OPERATION_ALL_MEASUREMENTS: u8 = 0xFF;
pub const SPDM_KEY_EXCHANGE_REQUEST_ALL_MEASUREMENTS_HASH: u8 = 0xFF;

pub const SPDM_MEASUREMENT_SPECIFICATION_DMTF: u8 = 0x01;
pub const SPDM_ALGORITHMS_BASE_ASYM_ALGO_ECDSA_P384: u32 = 0x80;
pub const SPDM_ALGORITHMS_BASE_HASH_ALGO_SHA_384: u32 = 0x02;
pub const SPDM_ALGORITHMS_DHE_NAMED_GROUP_SECP_384_R1: u16 = 0x10;
pub const SPDM_ALGORITHMS_AEAD_CIPHER_SUITE_AES_256_GCM: u16 = 0x02;
pub const SPDM_ALGORITHMS_REQ_BASE_ASYM_ALG_ECDSA_P384: u16 = 0x80;
pub const SPDM_ALGORITHMS_KEY_SCHEDULE_HMAC_HASH: u16 = 0x01;
pub const SPDM_ALGORITHMS_OPAQUE_DATA_FORMAT_1: u8 = 0x02;

pub const SHA384_LEN: usize = 48;
pub const MAX_SLOT_COUNT: u8 = 8;
