// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Capability seam over the native SPDM requester library.

use super::capability::{SpdmMeasurementAttributes, SpdmResponseCapabilityFlags};
use super::error::SpdmResult;
use super::status::LibSpdmReturn;
use async_trait::async_trait;
use core::fmt;
use core::time::Duration;

/// Transport callbacks the engine drives while an exchange is in progress.
#[async_trait]
pub trait SpdmDeviceIo {
    async fn send(&mut self, buffer: &[u8]) -> Result<(), LibSpdmReturn>;

    async fn receive(&mut self, timeout: Duration) -> Result<Vec<u8>, LibSpdmReturn>;
}

#[allow(non_camel_case_types)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum LibSpdmDataType {
    LIBSPDM_DATA_SPDM_VERSION = 0,
    LIBSPDM_DATA_SECURED_MESSAGE_VERSION = 1,
    LIBSPDM_DATA_CAPABILITY_FLAGS = 2,
    LIBSPDM_DATA_CAPABILITY_CT_EXPONENT = 3,
    LIBSPDM_DATA_MEASUREMENT_SPEC = 8,
    LIBSPDM_DATA_MEASUREMENT_HASH_ALGO = 9,
    LIBSPDM_DATA_BASE_ASYM_ALGO = 10,
    LIBSPDM_DATA_BASE_HASH_ALGO = 11,
    LIBSPDM_DATA_DHE_NAME_GROUP = 12,
    LIBSPDM_DATA_AEAD_CIPHER_SUITE = 13,
    LIBSPDM_DATA_REQ_BASE_ASYM_ALG = 14,
    LIBSPDM_DATA_KEY_SCHEDULE = 15,
    LIBSPDM_DATA_OTHER_PARAMS_SUPPORT = 16,
    LIBSPDM_DATA_LOCAL_PUBLIC_CERT_CHAIN = 24,
}

impl LibSpdmDataType {
    pub fn get_u32(&self) -> u32 {
        *self as u32
    }
}

impl fmt::Display for LibSpdmDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LibSpdmDataLocation {
    Local,
    Connection,
    Session,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LibSpdmDataParameter {
    pub location: LibSpdmDataLocation,
    pub additional_data: [u8; 4],
}

impl LibSpdmDataParameter {
    pub fn local() -> Self {
        LibSpdmDataParameter {
            location: LibSpdmDataLocation::Local,
            additional_data: [0u8; 4],
        }
    }

    pub fn local_slot(slot_id: u8) -> Self {
        LibSpdmDataParameter {
            location: LibSpdmDataLocation::Local,
            additional_data: [slot_id, 0, 0, 0],
        }
    }
}

/// Result of a successful KEY_EXCHANGE/FINISH pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdmSessionInfo {
    pub session_id: u32,
    pub measurement_hash: Vec<u8>,
}

/// The native engine, one instance per device connection.
///
/// Fallible calls hand back the raw status word; the driver maps it.
#[async_trait]
pub trait SpdmEngine: Send {
    fn get_context_size(&self) -> usize;

    fn prepare_context(
        &mut self,
        device_io: Box<dyn SpdmDeviceIo + Send>,
    ) -> Result<(), LibSpdmReturn>;

    fn set_data(
        &mut self,
        data_type: LibSpdmDataType,
        parameter: &LibSpdmDataParameter,
        data: &[u8],
    ) -> Result<(), LibSpdmReturn>;

    async fn init_connection(&mut self, get_version_only: bool) -> Result<(), LibSpdmReturn>;

    /// Negotiated version byte, e.g. 0x12.
    fn get_version(&self) -> Result<u8, LibSpdmReturn>;

    fn get_responder_capability_flags(&self)
        -> Result<SpdmResponseCapabilityFlags, LibSpdmReturn>;

    /// Slot mask and the concatenated digests of populated slots.
    async fn get_digest(&mut self) -> Result<(u8, Vec<u8>), LibSpdmReturn>;

    async fn get_certificate(&mut self, slot_id: u8) -> Result<Vec<u8>, LibSpdmReturn>;

    async fn get_measurement(
        &mut self,
        session_id: Option<u32>,
        attributes: SpdmMeasurementAttributes,
        operation: u8,
        slot_id: u8,
    ) -> Result<Vec<u8>, LibSpdmReturn>;

    async fn set_certificate(
        &mut self,
        session_id: Option<u32>,
        slot_id: u8,
        cert_chain: &[u8],
    ) -> Result<(), LibSpdmReturn>;

    async fn start_session(
        &mut self,
        use_psk: bool,
        measurement_hash_type: u8,
        slot_id: u8,
        session_policy: u8,
    ) -> Result<SpdmSessionInfo, LibSpdmReturn>;

    async fn stop_session(
        &mut self,
        session_id: u32,
        end_session_attributes: u8,
    ) -> Result<(), LibSpdmReturn>;

    async fn send_receive_data(
        &mut self,
        session_id: Option<u32>,
        is_app_message: bool,
        request: &[u8],
    ) -> Result<Vec<u8>, LibSpdmReturn>;

    /// Drops native session state without talking to the device.
    fn free_session(&mut self, session_id: u32);

    fn deinit_context(&mut self);
}

/// Stands in for linking the native library.
pub trait SpdmEngineLoader: Send + Sync {
    fn load(&self) -> SpdmResult<Box<dyn SpdmEngine>>;
}
