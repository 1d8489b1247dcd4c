// Copyright (c) 2026 Meridian Foundation

//! Deterministic, length-prefixed binary encoding for persisted records.
//!
//! The writer accumulates typed values in a fixed order into a single byte
//! buffer; the matching reader consumes them in the same order. There are no
//! self-describing tags -- writer and reader must agree on the schema out of
//! band, which is what makes the format deterministic and compact.
//!
//! Layout rules:
//! - fixed-width integers are big-endian
//! - byte arrays and UTF-8 strings carry a u32 length prefix
//! - sets of u64 carry a u32 count prefix and are written ascending; the
//!   ascending order is part of the wire format (pruning relies on it)

use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected end of input: needed {needed} bytes at offset {offset}")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("length prefix {len} exceeds remaining {remaining} bytes")]
    BadLength { len: usize, remaining: usize },

    #[error("invalid utf-8 in string field")]
    InvalidUtf8,

    #[error("invalid {field}")]
    InvalidField { field: &'static str },
}

/// Accumulates typed values into a byte buffer.
#[derive(Default)]
pub struct Encoder {
    buf: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    pub fn write_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.write_u32(bytes.len() as u32);
        self.buf.extend_from_slice(bytes);
    }

    pub fn write_string(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Writes the set count-prefixed in ascending order.
    pub fn write_u64_set(&mut self, set: &BTreeSet<u64>) {
        self.write_u32(set.len() as u32);
        for v in set {
            self.write_u64(*v);
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Consumes typed values from a byte buffer, optionally starting at an offset.
///
/// Every read is bounds-checked; a truncated or corrupt buffer yields a
/// `DecodeError`, never a panic or an out-of-bounds read.
pub struct Decoder<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn new_at(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, pos: offset }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n,
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.take(1)?[0] != 0)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.take(2)?.try_into().unwrap()))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
    }

    pub fn read_slice(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_u32()? as usize;
        if len > self.remaining() {
            return Err(DecodeError::BadLength {
                len,
                remaining: self.remaining(),
            });
        }
        self.take(len)
    }

    pub fn read_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        self.read_slice().map(|s| s.to_vec())
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let bytes = self.read_slice()?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8)
    }

    pub fn read_u64_set(&mut self) -> Result<BTreeSet<u64>, DecodeError> {
        let count = self.read_u32()? as usize;
        let mut set = BTreeSet::new();
        for _ in 0..count {
            set.insert(self.read_u64()?);
        }
        Ok(set)
    }
}
