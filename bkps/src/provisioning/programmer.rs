// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Messages relayed to the device by the programmer tool, and its answers.

use super::error::{ProvisioningError, ProvisioningResult};
use serde::{Deserialize, Serialize};

bitflags! {
    /// Programmer commands, as advertised in `supported_commands`.
    #[derive(Default)]
    pub struct MessageType: u32 {
        const SEND_PACKET = 0b0000_0001;
        const PUSH_WRAPPED_KEY = 0b0000_0010;
        const PUSH_WRAPPED_KEY_USER_IID = 0b0000_0100;
        const PUSH_WRAPPED_KEY_UDS_IID = 0b0000_1000;
        const PUSH_HELPER_DATA_UDS_IID = 0b0001_0000;
        const PUSH_HELPER_DATA_UDS_INTEL = 0b0010_0000;
        const PUSH_WRAPPED_KEYS = Self::PUSH_WRAPPED_KEY.bits
            | Self::PUSH_WRAPPED_KEY_USER_IID.bits
            | Self::PUSH_WRAPPED_KEY_UDS_IID.bits;
    }
}

impl MessageType {
    /// Every command in `expected` is supported.
    pub fn are_set_in(expected: MessageType, supported: u32) -> bool {
        MessageType::from_bits_truncate(supported).contains(expected)
    }

    /// At least one command in `expected` is supported. An empty set always is.
    pub fn at_least_one_is_set_in(expected: MessageType, supported: u32) -> bool {
        expected.is_empty() || MessageType::from_bits_truncate(supported).intersects(expected)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammerMessage {
    pub message_type: MessageType,
    pub value: Vec<u8>,
}

impl ProgrammerMessage {
    pub fn new(message_type: MessageType, value: Vec<u8>) -> Self {
        ProgrammerMessage {
            message_type,
            value,
        }
    }

    pub fn send_packet(value: Vec<u8>) -> Self {
        Self::new(MessageType::SEND_PACKET, value)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    StOk,
    StGenericError,
}

impl Default for ResponseStatus {
    fn default() -> Self {
        ResponseStatus::StOk
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgrammerResponse {
    pub value: Vec<u8>,
    pub status: ResponseStatus,
}

impl ProgrammerResponse {
    pub fn ok(value: Vec<u8>) -> Self {
        ProgrammerResponse {
            value,
            status: ResponseStatus::StOk,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::StOk
    }
}

/// One programmer response is expected per device round trip.
pub fn verify_number_of_responses(
    responses: &[ProgrammerResponse],
    expected: usize,
) -> ProvisioningResult<()> {
    if responses.len() != expected {
        error!(
            "Unexpected number of programmer responses: {}",
            responses.len()
        );
        return Err(ProvisioningError::Generic(format!(
            "Expected {} responses from programmer, got {}.",
            expected,
            responses.len()
        )));
    }
    Ok(())
}

/// Hands out response values in the order the programmer returned them.
pub struct ProgrammerResponseToDataAdapter<'a> {
    responses: core::slice::Iter<'a, ProgrammerResponse>,
}

impl<'a> ProgrammerResponseToDataAdapter<'a> {
    pub fn new(responses: &'a [ProgrammerResponse]) -> Self {
        ProgrammerResponseToDataAdapter {
            responses: responses.iter(),
        }
    }

    pub fn get_next(&mut self) -> ProvisioningResult<&'a [u8]> {
        self.responses
            .next()
            .map(|r| r.value.as_slice())
            .ok_or_else(|| ProvisioningError::generic("Missing response from programmer."))
    }
}
