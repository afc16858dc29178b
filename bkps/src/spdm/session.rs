// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::error::{SpdmError, SpdmResult};
use super::protocol::SpdmProtocol12;
use codec::{Reader, Writer};

/// VENDOR_DEFINED_REQUEST, USB standard id (LE), vendor id length, vendor id 0x09FB.
const SPDM_VENDOR_HEADER: [u8; 9] = [0x12, 0xFE, 0x00, 0x00, 0x02, 0x00, 0x02, 0xFB, 0x09];
pub const SPDM_HEADER_ERROR_LEN: usize = 4;
const SPDM_ERROR_CODE: u8 = 0x7F;
const OFFSET_FROM_HEADER_TO_RESPONSE_PAYLOAD: usize = 7;

/// Frames vendor payloads for the device inside an established session.
pub struct SpdmSecureSessionMessageSender<'a> {
    protocol: &'a mut SpdmProtocol12,
}

impl<'a> SpdmSecureSessionMessageSender<'a> {
    pub fn new(protocol: &'a mut SpdmProtocol12) -> Self {
        SpdmSecureSessionMessageSender { protocol }
    }

    pub async fn start_session(&mut self, measurement_slot_id: u8) -> SpdmResult {
        info!("*** STARTING SPDM SECURE SESSION ***");
        self.protocol.start_secure_session(measurement_slot_id).await
    }

    pub async fn send_data(&mut self, payload: &[u8]) -> SpdmResult<Vec<u8>> {
        info!("*** SENDING DATA IN SECURE SESSION ***");
        let request = build_vendor_defined_request(payload)?;
        let response = self.protocol.send_receive_data_in_session(&request).await?;
        parse_vendor_defined_response(&response)
    }

    pub async fn end_session(&mut self) -> SpdmResult {
        info!("*** ENDING SECURE SESSION ***");
        self.protocol.stop_secure_session().await
    }
}

pub fn build_vendor_defined_request(payload: &[u8]) -> SpdmResult<Vec<u8>> {
    if payload.len() > u16::MAX as usize {
        return Err(SpdmError::Runtime(format!(
            "Vendor defined payload too long: {} bytes",
            payload.len()
        )));
    }
    let mut w = Writer::with_capacity(SPDM_VENDOR_HEADER.len() + 2 + payload.len());
    w.extend_from_slice(&SPDM_VENDOR_HEADER);
    w.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    w.extend_from_slice(payload);
    Ok(w.into_vec())
}

pub fn parse_vendor_defined_response(response: &[u8]) -> SpdmResult<Vec<u8>> {
    let r = &mut Reader::init(response);
    let header = r
        .take(SPDM_HEADER_ERROR_LEN)
        .map_err(|e| SpdmError::Runtime(format!("SPDM response too short: {}", e)))?;
    if header[1] == SPDM_ERROR_CODE {
        return Err(SpdmError::Runtime(format!(
            "SPDM Command failed: {}",
            hex::encode_upper(header)
        )));
    }
    r.skip(OFFSET_FROM_HEADER_TO_RESPONSE_PAYLOAD)
        .map_err(|e| SpdmError::Runtime(format!("SPDM response too short: {}", e)))?;
    Ok(r.rest().to_vec())
}
