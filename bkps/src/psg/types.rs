// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::error::{PsgError, PsgResult};
use core::convert::TryFrom;
use core::fmt;
use serde::{Deserialize, Serialize};

/// SDM certificate format version carried in the AES key entry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PsgAesKeyType {
    Sdm12,
    Sdm15,
}

impl PsgAesKeyType {
    pub fn get_version(&self) -> u32 {
        match self {
            PsgAesKeyType::Sdm12 => 0,
            PsgAesKeyType::Sdm15 => 2,
        }
    }

    pub fn from_version(version: u32) -> PsgResult<Self> {
        match version {
            0 => Ok(PsgAesKeyType::Sdm12),
            2 => Ok(PsgAesKeyType::Sdm15),
            v => Err(PsgError::IllegalArgument(format!(
                "Unknown PSG AES key version: {}",
                v
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageType {
    Efuses,
    Bbram,
    Pufss,
}

impl StorageType {
    pub fn get_u8(&self) -> u8 {
        match self {
            StorageType::Efuses => 1,
            StorageType::Bbram => 2,
            StorageType::Pufss => 3,
        }
    }

    /// PUF secure storage keys are pushed wrapped.
    pub fn is_key_wrapping(&self) -> bool {
        *self == StorageType::Pufss
    }
}

impl TryFrom<u8> for StorageType {
    type Error = PsgError;

    fn try_from(value: u8) -> PsgResult<Self> {
        match value {
            1 => Ok(StorageType::Efuses),
            2 => Ok(StorageType::Bbram),
            3 => Ok(StorageType::Pufss),
            v => Err(PsgError::IllegalArgument(format!(
                "Cannot cast value {} to any Storage Type",
                v
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyWrappingType {
    #[serde(rename = "NOWRAP")]
    NoWrap,
    Internal,
    UserIidPuf,
    UdsIidPuf,
    UdsIntelPuf,
}

impl KeyWrappingType {
    pub fn get_u8(&self) -> u8 {
        match self {
            KeyWrappingType::NoWrap => 0,
            KeyWrappingType::Internal => 1,
            KeyWrappingType::UserIidPuf => 2,
            KeyWrappingType::UdsIidPuf => 3,
            KeyWrappingType::UdsIntelPuf => 4,
        }
    }
}

impl TryFrom<u8> for KeyWrappingType {
    type Error = PsgError;

    fn try_from(value: u8) -> PsgResult<Self> {
        match value {
            0 => Ok(KeyWrappingType::NoWrap),
            1 => Ok(KeyWrappingType::Internal),
            2 => Ok(KeyWrappingType::UserIidPuf),
            3 => Ok(KeyWrappingType::UdsIidPuf),
            4 => Ok(KeyWrappingType::UdsIntelPuf),
            v => Err(PsgError::IllegalArgument(format!(
                "Cannot cast value {} to any Key Wrapping Type",
                v
            ))),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FipsMode {
    NonFips,
    FipsLevel1,
    FipsLevel2,
    FipsLevel3,
}

impl FipsMode {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => FipsMode::NonFips,
            0b01 => FipsMode::FipsLevel1,
            0b10 => FipsMode::FipsLevel2,
            _ => FipsMode::FipsLevel3,
        }
    }

    pub fn get_bits(&self) -> u8 {
        match self {
            FipsMode::NonFips => 0b00,
            FipsMode::FipsLevel1 => 0b01,
            FipsMode::FipsLevel2 => 0b10,
            FipsMode::FipsLevel3 => 0b11,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EfuseTestFlag {
    Physical,
    Virtual,
}

impl EfuseTestFlag {
    pub fn from_bit(set: bool) -> Self {
        if set {
            EfuseTestFlag::Virtual
        } else {
            EfuseTestFlag::Physical
        }
    }

    pub fn is_set(&self) -> bool {
        *self == EfuseTestFlag::Virtual
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageType::Efuses => "EFUSES",
            StorageType::Bbram => "BBRAM",
            StorageType::Pufss => "PUFSS",
        };
        f.write_str(s)
    }
}
