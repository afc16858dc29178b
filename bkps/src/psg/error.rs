// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use codec::BufferUnderflow;
use core::fmt;

pub const RESERVED_NOT_ZERO: &str = "Reserved field contains value different than 0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PsgError {
    /// The buffer ended before the layout did.
    BufferUnderflow(BufferUnderflow),
    /// Bad magic, non-zero reserved region, version mismatch or bad length.
    ParseStructure(String),
    /// A value that has no mapping at all.
    IllegalArgument(String),
}

pub type PsgResult<T> = core::result::Result<T, PsgError>;

impl PsgError {
    pub fn is_underflow(&self) -> bool {
        matches!(self, PsgError::BufferUnderflow(_))
    }

    pub(crate) fn invalid_magic(what: &str, actual: u32, expected: u32) -> Self {
        PsgError::ParseStructure(format!(
            "Invalid {} 0x{:x}, expected 0x{:x}",
            what, actual, expected
        ))
    }

    pub(crate) fn reserved_not_zero() -> Self {
        PsgError::ParseStructure(RESERVED_NOT_ZERO.to_string())
    }
}

impl From<BufferUnderflow> for PsgError {
    fn from(e: BufferUnderflow) -> Self {
        PsgError::BufferUnderflow(e)
    }
}

impl fmt::Display for PsgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PsgError::BufferUnderflow(e) => write!(f, "{}", e),
            PsgError::ParseStructure(msg) | PsgError::IllegalArgument(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for PsgError {}

/// Reserved regions must be zero filled.
pub(crate) fn ensure_reserved_zero(bytes: &[u8]) -> PsgResult<()> {
    if bytes.iter().any(|b| *b != 0) {
        return Err(PsgError::reserved_not_zero());
    }
    Ok(())
}

pub(crate) fn ensure_magic(what: &str, actual: u32, expected: u32) -> PsgResult<()> {
    if actual != expected {
        error!("{} mismatch: 0x{:x}", what, actual);
        return Err(PsgError::invalid_magic(what, actual, expected));
    }
    Ok(())
}
