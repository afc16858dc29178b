// Copyright (c) 2023 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

//! Byte order conversion between the firmware wire form and the canonical
//! (big-endian) form used inside the service.

use codec::{BufferUnderflow, Reader, Writer};

/// Which side produced or will consume the bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EndiannessActor {
    Firmware,
    Service,
}

impl Default for EndiannessActor {
    fn default() -> Self {
        EndiannessActor::Firmware
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// 4-byte integer
    Word,
    /// 8-byte integer
    Long,
    /// opaque bytes, never swapped
    Raw,
}

/// Converts one field between the actor's byte order and the canonical one.
///
/// Firmware integers are little-endian on the wire, so they are reversed.
/// The transform is its own inverse: the same call is used for parsing and
/// for building.
pub fn convert(bytes: &[u8], field: FieldSpec, actor: EndiannessActor) -> Vec<u8> {
    match (field, actor) {
        (FieldSpec::Raw, _) | (_, EndiannessActor::Service) => bytes.to_vec(),
        (FieldSpec::Word, EndiannessActor::Firmware)
        | (FieldSpec::Long, EndiannessActor::Firmware) => bytes.iter().rev().copied().collect(),
    }
}

pub fn read_word(r: &mut Reader, actor: EndiannessActor) -> Result<u32, BufferUnderflow> {
    let raw = r.take_array::<4>()?;
    let mut canonical = [0u8; 4];
    canonical.copy_from_slice(&convert(&raw, FieldSpec::Word, actor));
    Ok(u32::from_be_bytes(canonical))
}

pub fn read_long(r: &mut Reader, actor: EndiannessActor) -> Result<u64, BufferUnderflow> {
    let raw = r.take_array::<8>()?;
    let mut canonical = [0u8; 8];
    canonical.copy_from_slice(&convert(&raw, FieldSpec::Long, actor));
    Ok(u64::from_be_bytes(canonical))
}

pub fn put_word(w: &mut Writer, value: u32, actor: EndiannessActor) -> usize {
    w.extend_from_slice(&convert(&value.to_be_bytes(), FieldSpec::Word, actor))
}

pub fn put_long(w: &mut Writer, value: u64, actor: EndiannessActor) -> usize {
    w.extend_from_slice(&convert(&value.to_be_bytes(), FieldSpec::Long, actor))
}
