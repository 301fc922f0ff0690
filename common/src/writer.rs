// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded record writer for the kernel upcall buffer.
//
// Wire conventions (shared with the kernel-side parser):
//   fixed fields:  raw native-endian bytes, no padding
//   opaque fields: [4 bytes: native-endian length] [N bytes: payload]

use crate::error::WriteError;

/// Capacity of every upcall record. The destination is allocated once at
/// this size and never grows.
pub const MAX_CTX_LEN: usize = 4096;

/// Size of the length prefix in front of every opaque field.
pub const OPAQUE_PREFIX_LEN: usize = 4;

/// Fixed-width values that can be appended to a record.
pub trait WireScalar: Copy {
    const SIZE: usize;

    fn put_ne(self, dst: &mut [u8]);
}

macro_rules! wire_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl WireScalar for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                fn put_ne(self, dst: &mut [u8]) {
                    dst.copy_from_slice(&self.to_ne_bytes());
                }
            }
        )*
    };
}

wire_scalar!(u32);

/// Append-only cursor over a pre-sized, zero-filled buffer.
#[derive(Debug)]
pub struct RecordWriter {
    buf: Vec<u8>,
    pos: usize,
}

impl RecordWriter {
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; MAX_CTX_LEN],
            pos: 0,
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Append a fixed-width value in native byte order.
    pub fn append_fixed<T: WireScalar>(&mut self, value: T) -> Result<(), WriteError> {
        let dst = self.reserve(T::SIZE)?;
        value.put_ne(dst);
        Ok(())
    }

    /// Append raw bytes with no length prefix.
    pub fn append_bytes(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        let dst = self.reserve(bytes.len())?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Append a 4-byte length prefix followed by `bytes`.
    ///
    /// Both parts are bounds-checked before anything is written, so a failed
    /// append leaves the cursor where it was.
    pub fn append_opaque(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| WriteError::OpaqueTooLong { len: bytes.len() })?;

        let remaining = self.remaining();
        if remaining < OPAQUE_PREFIX_LEN {
            return Err(WriteError::PrefixOverflow { remaining });
        }
        let needed = OPAQUE_PREFIX_LEN + bytes.len();
        if needed > remaining {
            return Err(WriteError::Overflow { needed, remaining });
        }

        self.append_fixed(len)?;
        self.append_bytes(bytes)
    }

    /// Hand the written prefix over as a finished record.
    pub fn finish(mut self) -> SerializedRecord {
        // truncate keeps the original allocation
        self.buf.truncate(self.pos);
        SerializedRecord { buf: self.buf }
    }

    fn reserve(&mut self, needed: usize) -> Result<&mut [u8], WriteError> {
        let remaining = self.remaining();
        if needed > remaining {
            return Err(WriteError::Overflow { needed, remaining });
        }
        let start = self.pos;
        self.pos += needed;
        Ok(&mut self.buf[start..self.pos])
    }
}

impl Default for RecordWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// A complete upcall record, at most [`MAX_CTX_LEN`] bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedRecord {
    buf: Vec<u8>,
}

impl SerializedRecord {
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }
}

impl AsRef<[u8]> for SerializedRecord {
    fn as_ref(&self) -> &[u8] {
        &self.buf
    }
}
