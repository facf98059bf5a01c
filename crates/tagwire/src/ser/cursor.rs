// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Read/write cursors for the tagged wire format.
//!
//! `CursorMut` appends to a growable buffer, `Cursor` reads from a borrowed
//! slice. Every fixed-width field is big-endian.

use super::{SerError, SerResult};

/// Generate append methods for fixed-width primitives.
macro_rules! impl_write_be {
    ($name:ident, $type:ty) => {
        pub fn $name(&mut self, value: $type) {
            self.buffer.extend_from_slice(&value.to_be_bytes());
        }
    };
}

/// Generate read methods for fixed-width primitives.
///
/// Each generated method:
/// 1. Refuses to read from a poisoned cursor
/// 2. Checks buffer bounds (poisons and returns `SerError::ReadFailed` on overflow)
/// 3. Converts bytes via `from_be_bytes()` and advances the offset
macro_rules! impl_read_be {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> SerResult<$type> {
            let bytes = self.read_bytes($size)?;
            let mut raw = [0u8; $size];
            raw.copy_from_slice(bytes);
            Ok(<$type>::from_be_bytes(raw))
        }
    };
}

/// Appending cursor used by the encoder.
pub struct CursorMut<'a> {
    buffer: &'a mut Vec<u8>,
}

impl<'a> CursorMut<'a> {
    pub fn new(buffer: &'a mut Vec<u8>) -> Self {
        Self { buffer }
    }

    impl_write_be!(write_i8, i8);
    impl_write_be!(write_i16_be, i16);
    impl_write_be!(write_u16_be, u16);
    impl_write_be!(write_i32_be, i32);
    impl_write_be!(write_u32_be, u32);
    impl_write_be!(write_i64_be, i64);
    impl_write_be!(write_f32_be, f32);
    impl_write_be!(write_f64_be, f64);

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Canonical boolean byte (`0` or `1`).
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// UTF-8 string behind a `u16` byte-length prefix.
    pub fn write_str_u16(&mut self, value: &str) -> SerResult<()> {
        let len = u16::try_from(value.len()).map_err(|_| SerError::WriteFailed {
            offset: self.offset(),
            reason: format!("string of {} bytes exceeds u16 prefix", value.len()),
        })?;
        self.write_u16_be(len);
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    /// UTF-8 string behind a `u32` byte-length prefix.
    pub fn write_str_u32(&mut self, value: &str) -> SerResult<()> {
        self.write_bytes_u32(value.as_bytes())
    }

    /// Opaque bytes behind a `u32` length prefix.
    pub fn write_bytes_u32(&mut self, data: &[u8]) -> SerResult<()> {
        let len = u32::try_from(data.len()).map_err(|_| SerError::WriteFailed {
            offset: self.offset(),
            reason: format!("payload of {} bytes exceeds u32 prefix", data.len()),
        })?;
        self.write_u32_be(len);
        self.write_bytes(data);
        Ok(())
    }

    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    /// Drop everything written after `offset`.
    pub fn rewind(&mut self, offset: usize) {
        self.buffer.truncate(offset);
    }
}

/// Reading cursor used by the decoder.
///
/// The first failed read poisons the cursor: every later read reports
/// [`SerError::Poisoned`] instead of interpreting misaligned bytes.
pub struct Cursor<'a> {
    buffer: &'a [u8],
    offset: usize,
    poisoned: bool,
}

impl<'a> Cursor<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            poisoned: false,
        }
    }

    impl_read_be!(read_i8, i8, 1);
    impl_read_be!(read_u8, u8, 1);
    impl_read_be!(read_i16_be, i16, 2);
    impl_read_be!(read_u16_be, u16, 2);
    impl_read_be!(read_i32_be, i32, 4);
    impl_read_be!(read_u32_be, u32, 4);
    impl_read_be!(read_i64_be, i64, 8);
    impl_read_be!(read_f32_be, f32, 4);
    impl_read_be!(read_f64_be, f64, 8);

    pub fn read_bool(&mut self) -> SerResult<bool> {
        let at = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(self.fail(SerError::InvalidData {
                offset: at,
                reason: format!("non-canonical boolean byte 0x{:02x}", other),
            })),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> SerResult<&'a [u8]> {
        if self.poisoned {
            return Err(SerError::Poisoned {
                offset: self.offset,
            });
        }
        if len > self.remaining() {
            return Err(self.fail(SerError::ReadFailed {
                offset: self.offset,
                reason: "unexpected end of buffer".into(),
            }));
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    /// UTF-8 string behind a `u16` byte-length prefix.
    pub fn read_str_u16(&mut self) -> SerResult<String> {
        let len = self.read_u16_be()? as usize;
        self.read_utf8(len)
    }

    /// UTF-8 string behind a `u32` byte-length prefix, bounded by `max_len`.
    pub fn read_str_u32(&mut self, max_len: usize) -> SerResult<String> {
        let len = self.read_len_u32(max_len)?;
        self.read_utf8(len)
    }

    /// Opaque bytes behind a `u32` length prefix, bounded by `max_len`.
    pub fn read_bytes_u32(&mut self, max_len: usize) -> SerResult<&'a [u8]> {
        let len = self.read_len_u32(max_len)?;
        self.read_bytes(len)
    }

    fn read_len_u32(&mut self, max_len: usize) -> SerResult<usize> {
        let at = self.offset;
        let len = self.read_u32_be()? as usize;
        if len > max_len {
            return Err(self.fail(SerError::InvalidData {
                offset: at,
                reason: format!("length prefix {} exceeds limit {}", len, max_len),
            }));
        }
        Ok(len)
    }

    fn read_utf8(&mut self, len: usize) -> SerResult<String> {
        let at = self.offset;
        let bytes = self.read_bytes(len)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_owned()),
            Err(e) => Err(self.fail(SerError::InvalidData {
                offset: at,
                reason: format!("invalid UTF-8: {}", e),
            })),
        }
    }

    /// Poison the cursor and hand the error back for propagation.
    pub fn fail(&mut self, err: SerError) -> SerError {
        self.poisoned = true;
        err
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }
}
