// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::endianness::{put_long, put_word, read_long, read_word, EndiannessActor};
use super::error::{ensure_magic, ensure_reserved_zero, PsgError, PsgResult};
use codec::{Codec, Reader, Writer};
use core::convert::TryFrom;

pub const QEK_MAGIC: u32 = 0x3673_36E4;
pub const QEK_KEY_TYPE_MAGIC: u32 = 0x4048_534D;
pub const QEK_DATA_LENGTH: u32 = 0xC0;
pub const QEK_SHA_LENGTH: u32 = 0x30;

pub const QEK_RESERVED_LEN: usize = 4;
pub const QEK_RESERVED_NO_SALT_LEN: usize = 16;
pub const QEK_IV_LEN: usize = 16;
pub const QEK_ENCRYPTED_AES_KEY_LEN: usize = 32;
pub const QEK_ENCRYPTED_KDK_LEN: usize = 32;

/// HSM-wrapped AES root key container.
#[derive(Debug, Clone)]
pub struct PsgQekBuilderHsm {
    actor: EndiannessActor,
    pub info_length: u32,
    pub key_length: u32,
    pub sha_length: u32,
    pub max_key_uses: u32,
    pub inter_key_num: u32,
    pub step: u32,
    pub total_key_uses: u64,
    pub iv: [u8; QEK_IV_LEN],
    pub encrypted_aes_key: [u8; QEK_ENCRYPTED_AES_KEY_LEN],
    pub encrypted_kdk: [u8; QEK_ENCRYPTED_KDK_LEN],
    pub encrypted_sha384: Vec<u8>,
}

impl Default for PsgQekBuilderHsm {
    fn default() -> Self {
        PsgQekBuilderHsm {
            actor: EndiannessActor::Firmware,
            info_length: 0,
            key_length: 0,
            sha_length: QEK_SHA_LENGTH,
            max_key_uses: 0,
            inter_key_num: 0,
            step: 0,
            total_key_uses: 0,
            iv: [0u8; QEK_IV_LEN],
            encrypted_aes_key: [0u8; QEK_ENCRYPTED_AES_KEY_LEN],
            encrypted_kdk: [0u8; QEK_ENCRYPTED_KDK_LEN],
            encrypted_sha384: Vec::new(),
        }
    }
}

impl PsgQekBuilderHsm {
    pub fn with_actor(mut self, actor: EndiannessActor) -> Self {
        self.actor = actor;
        self
    }

    pub fn parse(mut self, bytes: &[u8]) -> PsgResult<Self> {
        let r = &mut Reader::init(bytes);
        let magic = read_word(r, self.actor)?;
        ensure_magic("AES entry magic", magic, QEK_MAGIC)?;

        let data_length = read_word(r, self.actor)?;
        if data_length as usize != bytes.len() || data_length != QEK_DATA_LENGTH {
            error!(
                "QEK length {} does not fit buffer of {} bytes",
                data_length,
                bytes.len()
            );
            return Err(PsgError::ParseStructure(format!(
                "Invalid AES Root Key data length 0x{:x}, expected 0x{:x}",
                data_length, QEK_DATA_LENGTH
            )));
        }

        self.info_length = read_word(r, self.actor)?;
        self.key_length = read_word(r, self.actor)?;
        self.sha_length = read_word(r, self.actor)?;
        if self.sha_length != QEK_SHA_LENGTH {
            return Err(PsgError::ParseStructure(format!(
                "Invalid SHA length 0x{:x}, expected 0x{:x}",
                self.sha_length, QEK_SHA_LENGTH
            )));
        }
        ensure_reserved_zero(r.take(QEK_RESERVED_LEN)?)?;

        let key_type_magic = read_word(r, self.actor)?;
        ensure_magic(
            "AES Root Key type magic number",
            key_type_magic,
            QEK_KEY_TYPE_MAGIC,
        )?;

        self.max_key_uses = read_word(r, self.actor)?;
        self.inter_key_num = read_word(r, self.actor)?;
        self.step = read_word(r, self.actor)?;
        self.total_key_uses = read_long(r, self.actor)?;
        ensure_reserved_zero(r.take(QEK_RESERVED_NO_SALT_LEN)?)?;

        self.iv = <[u8; QEK_IV_LEN]>::read(r)?;
        self.encrypted_aes_key = <[u8; QEK_ENCRYPTED_AES_KEY_LEN]>::read(r)?;
        self.encrypted_kdk = <[u8; QEK_ENCRYPTED_KDK_LEN]>::read(r)?;
        self.encrypted_sha384 = r.rest().to_vec();
        Ok(self)
    }

    pub fn build(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(QEK_DATA_LENGTH as usize);
        put_word(&mut w, QEK_MAGIC, self.actor);
        put_word(&mut w, QEK_DATA_LENGTH, self.actor);
        put_word(&mut w, self.info_length, self.actor);
        put_word(&mut w, self.key_length, self.actor);
        put_word(&mut w, self.sha_length, self.actor);
        w.zeros(QEK_RESERVED_LEN);
        put_word(&mut w, QEK_KEY_TYPE_MAGIC, self.actor);
        put_word(&mut w, self.max_key_uses, self.actor);
        put_word(&mut w, self.inter_key_num, self.actor);
        put_word(&mut w, self.step, self.actor);
        put_long(&mut w, self.total_key_uses, self.actor);
        w.zeros(QEK_RESERVED_NO_SALT_LEN);
        self.iv.encode(&mut w);
        self.encrypted_aes_key.encode(&mut w);
        self.encrypted_kdk.encode(&mut w);
        w.extend_from_slice(&self.encrypted_sha384);
        w.into_vec()
    }
}

impl TryFrom<&[u8]> for PsgQekBuilderHsm {
    type Error = PsgError;

    fn try_from(bytes: &[u8]) -> PsgResult<Self> {
        PsgQekBuilderHsm::default().parse(bytes)
    }
}
