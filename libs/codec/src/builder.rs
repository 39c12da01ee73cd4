//! # Wire Writer - Padded Field Construction
//!
//! ## Purpose
//!
//! Appends fields to an outbound datagram in the layout both ends share:
//! strings as `[len:i32 BE][utf8][0-3 x '_']`, integers as 4-byte big-endian
//! and floating amounts as 8-byte big-endian IEEE-754, the fixed-width
//! encodings carrying no padding.
//!
//! ## Architecture Role
//!
//! ```text
//! Request / Reply → [WireWriter] → Bytes → UdpTransport
//! ```
//!
//! The declared length is always the unpadded content length; readers use
//! it to compute how much filler to skip.

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt::Display;
use types::{PADDING_BYTE, WIRE_ALIGNMENT};

/// Filler bytes needed after `len` content bytes to reach the next boundary
#[inline]
pub const fn padding_for(len: usize) -> usize {
    (WIRE_ALIGNMENT - len % WIRE_ALIGNMENT) % WIRE_ALIGNMENT
}

/// Encoded size of a string field with `len` content bytes
#[inline]
pub const fn encoded_field_len(len: usize) -> usize {
    4 + len + padding_for(len)
}

/// Encode one string as a standalone padded field
pub fn encode_string(s: &str) -> Bytes {
    let mut writer = WireWriter::with_capacity(encoded_field_len(s.len()));
    writer.put_str(s);
    writer.finish()
}

/// Builder for a sequence of heterogeneous wire fields
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: BytesMut,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Append a length-prefixed, padded UTF-8 field
    pub fn put_str(&mut self, s: &str) -> &mut Self {
        let content = s.as_bytes();
        self.buf.reserve(encoded_field_len(content.len()));
        self.buf.put_i32(content.len() as i32);
        self.buf.put_slice(content);
        self.buf.put_bytes(PADDING_BYTE, padding_for(content.len()));
        self
    }

    /// Append any displayable value as a string field
    ///
    /// Account numbers, amounts, currencies and status codes all travel this way.
    pub fn put_display(&mut self, value: impl Display) -> &mut Self {
        self.put_str(&value.to_string())
    }

    pub fn put_i32(&mut self, value: i32) -> &mut Self {
        self.buf.put_i32(value);
        self
    }

    pub fn put_f64(&mut self, value: f64) -> &mut Self {
        self.buf.put_f64(value);
        self
    }

    /// Append raw bytes with no length prefix (correlation id)
    pub fn put_raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.put_slice(bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}
