// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::aes_key_sdm12::PsgAesKeyBuilderSdm12;
use super::aes_key_sdm15::PsgAesKeyBuilderSdm15;
use super::endianness::{put_word, read_word, EndiannessActor};
use super::error::{ensure_magic, PsgError, PsgResult};
use super::types::{KeyWrappingType, PsgAesKeyType, StorageType};
use codec::{Reader, Writer};

pub const PSG_AES_KEY_ENTRY_MAGIC: u32 = 0x25D0_4E7F;
pub const PSG_AES_KEY_USER_AES_CERT_MAGIC: u32 = 0xD085_0CAA;

/// Bytes in front of the version word: magic and length.
const VERSION_OFFSET: usize = 8;

/// The five words every AES key entry starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsgAesKeyHeader {
    pub magic: u32,
    pub cert_data_length: u32,
    pub cert_version: u32,
    pub cert_type: u32,
    pub user_aes_cert_magic: u32,
}

impl PsgAesKeyHeader {
    pub fn new(key_type: PsgAesKeyType, cert_data_length: u32, cert_type: u32) -> Self {
        PsgAesKeyHeader {
            magic: PSG_AES_KEY_ENTRY_MAGIC,
            cert_data_length,
            cert_version: key_type.get_version(),
            cert_type,
            user_aes_cert_magic: PSG_AES_KEY_USER_AES_CERT_MAGIC,
        }
    }

    /// Reads the header and rejects a version other than `expected`
    /// before anything past the version word is looked at.
    pub fn read(
        r: &mut Reader,
        actor: EndiannessActor,
        expected: PsgAesKeyType,
    ) -> PsgResult<Self> {
        let magic = read_word(r, actor)?;
        ensure_magic("entry magic", magic, PSG_AES_KEY_ENTRY_MAGIC)?;
        let cert_data_length = read_word(r, actor)?;
        let cert_version = read_word(r, actor)?;
        if cert_version != expected.get_version() {
            error!(
                "certificate version {} does not match builder {:?}",
                cert_version, expected
            );
            return Err(PsgError::ParseStructure(format!(
                "Mismatch between certificate SDM version and Builder version. \
                 Certificate SDM version: {}. Builder/parser version: {}",
                cert_version,
                expected.get_version()
            )));
        }
        let cert_type = read_word(r, actor)?;
        let user_aes_cert_magic = read_word(r, actor)?;
        ensure_magic(
            "user aes entry magic",
            user_aes_cert_magic,
            PSG_AES_KEY_USER_AES_CERT_MAGIC,
        )?;
        Ok(PsgAesKeyHeader {
            magic,
            cert_data_length,
            cert_version,
            cert_type,
            user_aes_cert_magic,
        })
    }

    pub fn encode(&self, w: &mut Writer, actor: EndiannessActor) -> usize {
        let mut cnt = 0;
        cnt += put_word(w, self.magic, actor);
        cnt += put_word(w, self.cert_data_length, actor);
        cnt += put_word(w, self.cert_version, actor);
        cnt += put_word(w, self.cert_type, actor);
        cnt += put_word(w, self.user_aes_cert_magic, actor);
        cnt
    }
}

/// A parsed AES key entry of either SDM generation.
#[derive(Debug, Clone)]
pub enum PsgAesKeyBuilder {
    Sdm12(PsgAesKeyBuilderSdm12),
    Sdm15(PsgAesKeyBuilderSdm15),
}

impl PsgAesKeyBuilder {
    pub fn aes_key_type(&self) -> PsgAesKeyType {
        match self {
            PsgAesKeyBuilder::Sdm12(_) => PsgAesKeyType::Sdm12,
            PsgAesKeyBuilder::Sdm15(_) => PsgAesKeyType::Sdm15,
        }
    }

    pub fn parse(self, bytes: &[u8]) -> PsgResult<Self> {
        Ok(match self {
            PsgAesKeyBuilder::Sdm12(b) => PsgAesKeyBuilder::Sdm12(b.parse(bytes)?),
            PsgAesKeyBuilder::Sdm15(b) => PsgAesKeyBuilder::Sdm15(b.parse(bytes)?),
        })
    }

    pub fn build(&self) -> Vec<u8> {
        match self {
            PsgAesKeyBuilder::Sdm12(b) => b.build(),
            PsgAesKeyBuilder::Sdm15(b) => b.build(),
        }
    }

    pub fn storage_type(&self) -> Option<StorageType> {
        match self {
            PsgAesKeyBuilder::Sdm12(b) => b.storage_type,
            PsgAesKeyBuilder::Sdm15(b) => b.storage_type,
        }
    }

    pub fn key_wrapping_type(&self) -> Option<KeyWrappingType> {
        match self {
            PsgAesKeyBuilder::Sdm12(b) => b.key_wrapping_type,
            PsgAesKeyBuilder::Sdm15(b) => b.key_wrapping_type,
        }
    }
}

/// Picks the builder from the version word without parsing the rest.
pub struct PsgAesKeyBuilderFactory {
    actor: EndiannessActor,
}

impl Default for PsgAesKeyBuilderFactory {
    fn default() -> Self {
        PsgAesKeyBuilderFactory {
            actor: EndiannessActor::Firmware,
        }
    }
}

impl PsgAesKeyBuilderFactory {
    pub fn with_actor(mut self, actor: EndiannessActor) -> Self {
        self.actor = actor;
        self
    }

    pub fn get_psg_aes_key_builder(&self, bytes: &[u8]) -> PsgResult<PsgAesKeyBuilder> {
        let mut r = Reader::init(bytes);
        r.skip(VERSION_OFFSET)?;
        let version = read_word(&mut r, self.actor)?;
        debug!("PSG AES key version: {}", version);
        Ok(match PsgAesKeyType::from_version(version)? {
            PsgAesKeyType::Sdm12 => {
                PsgAesKeyBuilder::Sdm12(PsgAesKeyBuilderSdm12::default().with_actor(self.actor))
            }
            PsgAesKeyType::Sdm15 => {
                PsgAesKeyBuilder::Sdm15(PsgAesKeyBuilderSdm15::default().with_actor(self.actor))
            }
        })
    }
}
