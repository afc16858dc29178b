// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::aes_key::PsgAesKeyHeader;
use super::endianness::EndiannessActor;
use super::error::{ensure_reserved_zero, PsgError, PsgResult};
use super::flags::AesKeyFlags;
use super::types::{KeyWrappingType, PsgAesKeyType, StorageType};
use codec::{Codec, Reader, Writer};
use core::convert::TryFrom;

pub const SDM15_RESERVED_LEN: usize = 14;
pub const SDM15_USER_INPUT_IV_LEN: usize = 16;
pub const SDM15_MAC_TAG_LEN: usize = 48;
pub const SDM15_MAC_DATA_LEN: usize = 32;

/// SDM 1.5 user AES key entry. The root key itself travels separately,
/// wrapped inside a QEK.
#[derive(Debug, Clone)]
pub struct PsgAesKeyBuilderSdm15 {
    actor: EndiannessActor,
    pub cert_data_length: u32,
    pub cert_type: u32,
    pub flags: AesKeyFlags,
    pub storage_type: Option<StorageType>,
    pub key_wrapping_type: Option<KeyWrappingType>,
    pub user_input_iv: [u8; SDM15_USER_INPUT_IV_LEN],
    pub mac_tag: [u8; SDM15_MAC_TAG_LEN],
    pub mac_data: [u8; SDM15_MAC_DATA_LEN],
    pub certificate_signing_key_chain: Vec<u8>,
}

impl Default for PsgAesKeyBuilderSdm15 {
    fn default() -> Self {
        PsgAesKeyBuilderSdm15 {
            actor: EndiannessActor::Firmware,
            cert_data_length: 0,
            cert_type: 0,
            flags: AesKeyFlags::default(),
            storage_type: None,
            key_wrapping_type: None,
            user_input_iv: [0u8; SDM15_USER_INPUT_IV_LEN],
            mac_tag: [0u8; SDM15_MAC_TAG_LEN],
            mac_data: [0u8; SDM15_MAC_DATA_LEN],
            certificate_signing_key_chain: Vec::new(),
        }
    }
}

impl PsgAesKeyBuilderSdm15 {
    pub fn with_actor(mut self, actor: EndiannessActor) -> Self {
        self.actor = actor;
        self
    }

    pub fn parse(mut self, bytes: &[u8]) -> PsgResult<Self> {
        let r = &mut Reader::init(bytes);
        let header = PsgAesKeyHeader::read(r, self.actor, PsgAesKeyType::Sdm15)?;
        self.cert_data_length = header.cert_data_length;
        self.cert_type = header.cert_type;
        self.flags = AesKeyFlags::decode(r.take_array::<4>()?)?;
        self.storage_type = Some(StorageType::try_from(r.read_u8()?)?);
        self.key_wrapping_type = Some(KeyWrappingType::try_from(r.read_u8()?)?);
        ensure_reserved_zero(r.take(SDM15_RESERVED_LEN)?)?;
        self.user_input_iv = <[u8; SDM15_USER_INPUT_IV_LEN]>::read(r)?;
        self.mac_tag = <[u8; SDM15_MAC_TAG_LEN]>::read(r)?;
        self.mac_data = <[u8; SDM15_MAC_DATA_LEN]>::read(r)?;
        self.certificate_signing_key_chain = r.rest().to_vec();
        debug!(
            "SDM 1.5 AES key: storage {:?}, wrapping {:?}, flags {:?}",
            self.storage_type, self.key_wrapping_type, self.flags
        );
        Ok(self)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::new();
        PsgAesKeyHeader::new(PsgAesKeyType::Sdm15, self.cert_data_length, self.cert_type)
            .encode(&mut w, self.actor);
        w.extend_from_slice(&self.flags.encode());
        w.push(self.storage_type.map_or(0, |s| s.get_u8()));
        w.push(self.key_wrapping_type.map_or(0, |k| k.get_u8()));
        w.zeros(SDM15_RESERVED_LEN);
        self.user_input_iv.encode(&mut w);
        self.mac_tag.encode(&mut w);
        self.mac_data.encode(&mut w);
        w.extend_from_slice(&self.certificate_signing_key_chain);
        w.into_vec()
    }

    pub fn mac_data_is_empty(&self) -> bool {
        self.mac_data.iter().all(|b| *b == 0)
    }
}

impl TryFrom<&[u8]> for PsgAesKeyBuilderSdm15 {
    type Error = PsgError;

    fn try_from(bytes: &[u8]) -> PsgResult<Self> {
        PsgAesKeyBuilderSdm15::default().parse(bytes)
    }
}
