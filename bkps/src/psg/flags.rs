// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use super::error::{PsgError, PsgResult};
use super::types::{EfuseTestFlag, FipsMode};

const TEST_FLAG_BIT: u32 = 31;
const FIPS_MODE_SHIFT: u32 = 29;
const FIPS_MODE_MASK: u32 = 0b11;
const RESERVED_MASK: u32 = (1 << FIPS_MODE_SHIFT) - 1;

/// The "reserved with flags" word of an SDM 1.5 AES key entry.
///
/// The word is kept as raw wire bytes and read as a little-endian u32
/// regardless of the builder actor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AesKeyFlags {
    pub fips_mode: FipsMode,
    pub test_flag: EfuseTestFlag,
}

impl Default for AesKeyFlags {
    fn default() -> Self {
        AesKeyFlags {
            fips_mode: FipsMode::NonFips,
            test_flag: EfuseTestFlag::Physical,
        }
    }
}

impl AesKeyFlags {
    pub fn decode(raw: [u8; 4]) -> PsgResult<Self> {
        let word = u32::from_le_bytes(raw);
        if word & RESERVED_MASK != 0 {
            return Err(PsgError::reserved_not_zero());
        }
        let fips = ((word >> FIPS_MODE_SHIFT) & FIPS_MODE_MASK) as u8;
        Ok(AesKeyFlags {
            fips_mode: FipsMode::from_bits(fips),
            test_flag: EfuseTestFlag::from_bit(word >> TEST_FLAG_BIT == 1),
        })
    }

    pub fn encode(&self) -> [u8; 4] {
        let mut word = (self.fips_mode.get_bits() as u32 & FIPS_MODE_MASK) << FIPS_MODE_SHIFT;
        if self.test_flag.is_set() {
            word |= 1 << TEST_FLAG_BIT;
        }
        word.to_le_bytes()
    }
}
