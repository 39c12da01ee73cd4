//! # Wire Reader - Cursor-Based Field Decoding
//!
//! ## Purpose
//!
//! Decodes a sequence of heterogeneous fields against one advancing offset.
//! [`decode_field`] is the functional primitive: it takes a buffer and a
//! cursor and returns the value together with the next cursor, never
//! mutating shared state. [`WireReader`] wraps it for the common case of
//! reading a whole field list in order.
//!
//! A reader owns its offset and borrows its buffer, so each decode of an
//! envelope gets its own reader and nothing is shared between concurrent
//! decodes.
//!
//! ## Framing Rules
//!
//! - Length prefix is a big-endian `i32`; negative values are rejected
//! - The declared length counts content bytes only; padding is derived from it
//! - Content plus padding must fit inside the buffer, otherwise the field is
//!   truncated and the whole datagram is malformed

use crate::builder::padding_for;
use crate::error::{ProtocolError, ProtocolResult};
use std::str::FromStr;
use types::MAX_DATAGRAM_SIZE;

/// Decode one string field starting at `cursor`
///
/// Returns the borrowed content and the offset of the next field, which is
/// always past the padding.
pub fn decode_field(buf: &[u8], cursor: usize) -> ProtocolResult<(&str, usize)> {
    let (length, content_start) = decode_i32(buf, cursor)?;
    if length < 0 || length as usize > MAX_DATAGRAM_SIZE {
        return Err(ProtocolError::invalid_length(
            length as i64,
            cursor,
            buf.len(),
        ));
    }

    let length = length as usize;
    let available = buf.len() - content_start;
    let padded = length + padding_for(length);
    if padded > available {
        return Err(ProtocolError::truncated_field(cursor, length, available));
    }

    let content = &buf[content_start..content_start + length];
    let value = std::str::from_utf8(content).map_err(|_| ProtocolError::InvalidUtf8 {
        offset: content_start,
    })?;
    Ok((value, content_start + padded))
}

/// Decode a big-endian `i32` at `cursor`
pub fn decode_i32(buf: &[u8], cursor: usize) -> ProtocolResult<(i32, usize)> {
    let bytes = fixed(buf, cursor, 4, "i32 field")?;
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    Ok((i32::from_be_bytes(raw), cursor + 4))
}

/// Decode a big-endian IEEE-754 `f64` at `cursor`
pub fn decode_f64(buf: &[u8], cursor: usize) -> ProtocolResult<(f64, usize)> {
    let bytes = fixed(buf, cursor, 8, "f64 field")?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok((f64::from_be_bytes(raw), cursor + 8))
}

fn fixed<'a>(buf: &'a [u8], cursor: usize, width: usize, context: &str) -> ProtocolResult<&'a [u8]> {
    let end = cursor.checked_add(width).filter(|end| *end <= buf.len());
    match end {
        Some(end) => Ok(&buf[cursor..end]),
        None => Err(ProtocolError::message_too_small(
            cursor.saturating_add(width),
            buf.len(),
            format!("{} at offset {}", context, cursor),
        )),
    }
}

/// Sequential reader over one datagram
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Start reading at `offset`, typically just past the envelope header
    pub fn at(buf: &'a [u8], offset: usize) -> Self {
        Self { buf, offset }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.offset)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_i32(&mut self) -> ProtocolResult<i32> {
        let (value, next) = decode_i32(self.buf, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    pub fn read_f64(&mut self) -> ProtocolResult<f64> {
        let (value, next) = decode_f64(self.buf, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    /// Read raw bytes with no length prefix
    pub fn read_fixed(&mut self, width: usize) -> ProtocolResult<&'a [u8]> {
        let bytes = fixed(self.buf, self.offset, width, "fixed-width field")?;
        self.offset += width;
        Ok(bytes)
    }

    pub fn read_str(&mut self) -> ProtocolResult<&'a str> {
        let (value, next) = decode_field(self.buf, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    pub fn read_string(&mut self) -> ProtocolResult<String> {
        self.read_str().map(str::to_owned)
    }

    /// Read a string field and parse it as `T`, naming the field in errors
    pub fn read_parsed<T>(&mut self, field: &'static str) -> ProtocolResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.read_str()?;
        raw.parse()
            .map_err(|e| ProtocolError::invalid_field(field, raw, e))
    }
}
