// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::aes_key::PsgAesKeyHeader;
use super::endianness::EndiannessActor;
use super::error::{ensure_reserved_zero, PsgError, PsgResult};
use super::types::{KeyWrappingType, PsgAesKeyType, StorageType};
use codec::{Codec, Reader, Writer};
use core::convert::TryFrom;
use zeroize::{Zeroize, ZeroizeOnDrop};

pub const SDM12_RESERVED_BEFORE_STORAGE_LEN: usize = 3;
pub const SDM12_RESERVED_LEN: usize = 15;
pub const SDM12_USER_INPUT_IV_LEN: usize = 16;
pub const SDM12_USER_AES_ROOT_KEY_LEN: usize = 32;

#[derive(Debug, Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct UserAesRootKey {
    pub data: [u8; SDM12_USER_AES_ROOT_KEY_LEN],
}

/// SDM 1.2 user AES key entry, carrying the root key inline.
#[derive(Debug, Clone)]
pub struct PsgAesKeyBuilderSdm12 {
    actor: EndiannessActor,
    pub cert_data_length: u32,
    pub cert_type: u32,
    pub storage_type: Option<StorageType>,
    pub key_wrapping_type: Option<KeyWrappingType>,
    pub user_input_iv: [u8; SDM12_USER_INPUT_IV_LEN],
    pub user_aes_root_key: UserAesRootKey,
    pub certificate_signing_key_chain: Vec<u8>,
}

impl Default for PsgAesKeyBuilderSdm12 {
    fn default() -> Self {
        PsgAesKeyBuilderSdm12 {
            actor: EndiannessActor::Firmware,
            cert_data_length: 0,
            cert_type: 0,
            storage_type: None,
            key_wrapping_type: None,
            user_input_iv: [0u8; SDM12_USER_INPUT_IV_LEN],
            user_aes_root_key: UserAesRootKey::default(),
            certificate_signing_key_chain: Vec::new(),
        }
    }
}

impl PsgAesKeyBuilderSdm12 {
    pub fn with_actor(mut self, actor: EndiannessActor) -> Self {
        self.actor = actor;
        self
    }

    pub fn parse(mut self, bytes: &[u8]) -> PsgResult<Self> {
        let r = &mut Reader::init(bytes);
        let header = PsgAesKeyHeader::read(r, self.actor, PsgAesKeyType::Sdm12)?;
        self.cert_data_length = header.cert_data_length;
        self.cert_type = header.cert_type;
        ensure_reserved_zero(r.take(SDM12_RESERVED_BEFORE_STORAGE_LEN)?)?;
        self.storage_type = Some(StorageType::try_from(r.read_u8()?)?);
        self.key_wrapping_type = Some(KeyWrappingType::try_from(r.read_u8()?)?);
        ensure_reserved_zero(r.take(SDM12_RESERVED_LEN)?)?;
        self.user_input_iv = <[u8; SDM12_USER_INPUT_IV_LEN]>::read(r)?;
        self.user_aes_root_key.data = <[u8; SDM12_USER_AES_ROOT_KEY_LEN]>::read(r)?;
        self.certificate_signing_key_chain = r.rest().to_vec();
        debug!(
            "SDM 1.2 AES key: storage {:?}, wrapping {:?}",
            self.storage_type, self.key_wrapping_type
        );
        Ok(self)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::new();
        PsgAesKeyHeader::new(PsgAesKeyType::Sdm12, self.cert_data_length, self.cert_type)
            .encode(&mut w, self.actor);
        w.zeros(SDM12_RESERVED_BEFORE_STORAGE_LEN);
        w.push(self.storage_type.map_or(0, |s| s.get_u8()));
        w.push(self.key_wrapping_type.map_or(0, |k| k.get_u8()));
        w.zeros(SDM12_RESERVED_LEN);
        self.user_input_iv.encode(&mut w);
        self.user_aes_root_key.data.encode(&mut w);
        w.extend_from_slice(&self.certificate_signing_key_chain);
        w.into_vec()
    }
}

impl TryFrom<&[u8]> for PsgAesKeyBuilderSdm12 {
    type Error = PsgError;

    fn try_from(bytes: &[u8]) -> PsgResult<Self> {
        PsgAesKeyBuilderSdm12::default().parse(bytes)
    }
}
