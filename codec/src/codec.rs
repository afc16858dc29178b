// Copyright (c) 2020 Intel Corporation
//
// SPDX-License-Identifier: Apache-2.0 or MIT

use core::fmt;

/// A read went past the end of the buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BufferUnderflow {
    pub needed: usize,
    pub left: usize,
}

impl fmt::Display for BufferUnderflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Buffer underflow: needed {} bytes, {} left",
            self.needed, self.left
        )
    }
}

impl std::error::Error for BufferUnderflow {}

/// Read from a byte slice. Every accessor is bounds checked.
pub struct Reader<'a> {
    buf: &'a [u8],
    offs: usize,
}

impl<'a> Reader<'a> {
    pub fn init(bytes: &'a [u8]) -> Reader<'a> {
        Reader {
            buf: bytes,
            offs: 0,
        }
    }

    /// Everything not consumed yet. The reader ends up empty.
    pub fn rest(&mut self) -> &'a [u8] {
        let ret = &self.buf[self.offs..];
        self.offs = self.buf.len();
        ret
    }

    pub fn take(&mut self, len: usize) -> Result<&'a [u8], BufferUnderflow> {
        if self.left() < len {
            return Err(BufferUnderflow {
                needed: len,
                left: self.left(),
            });
        }

        let current = self.offs;
        self.offs += len;
        Ok(&self.buf[current..current + len])
    }

    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], BufferUnderflow> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), BufferUnderflow> {
        self.take(len).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, BufferUnderflow> {
        Ok(self.take(1)?[0])
    }

    pub fn any_left(&self) -> bool {
        self.offs < self.buf.len()
    }

    pub fn left(&self) -> usize {
        self.buf.len() - self.offs
    }

    pub fn used(&self) -> usize {
        self.offs
    }

    pub fn sub(&mut self, len: usize) -> Result<Reader<'a>, BufferUnderflow> {
        self.take(len).map(Reader::init)
    }
}

impl AsRef<[u8]> for Reader<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.buf[self.offs..]
    }
}

/// Append-only writer. Structures are built front to back in layout order.
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    pub fn new() -> Writer {
        Writer { buf: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Writer {
        Writer {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn extend_from_slice(&mut self, value: &[u8]) -> usize {
        self.buf.extend_from_slice(value);
        value.len()
    }

    pub fn push(&mut self, value: u8) -> usize {
        self.buf.push(value);
        1
    }

    /// Zero fill, used for reserved regions and padding.
    pub fn zeros(&mut self, len: usize) -> usize {
        self.buf.resize(self.buf.len() + len, 0);
        len
    }

    pub fn used(&self) -> usize {
        self.buf.len()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

/// Things we can encode and read from a Reader.
pub trait Codec: fmt::Debug + Sized {
    /// Encode yourself by appending onto `bytes`, returning the encoded size.
    fn encode(&self, bytes: &mut Writer) -> usize;

    /// Decode yourself by fiddling with the `Reader`.
    fn read(_: &mut Reader) -> Result<Self, BufferUnderflow>;

    /// Read one of these from the front of `bytes` and return it.
    fn read_bytes(bytes: &[u8]) -> Result<Self, BufferUnderflow> {
        let mut rd = Reader::init(bytes);
        Self::read(&mut rd)
    }
}

impl Codec for u8 {
    fn encode(&self, bytes: &mut Writer) -> usize {
        bytes.push(*self)
    }

    fn read(r: &mut Reader) -> Result<u8, BufferUnderflow> {
        r.read_u8()
    }
}

impl<const N: usize> Codec for [u8; N] {
    fn encode(&self, bytes: &mut Writer) -> usize {
        bytes.extend_from_slice(self)
    }

    fn read(reader: &mut Reader) -> Result<Self, BufferUnderflow> {
        reader.take_array::<N>()
    }
}
