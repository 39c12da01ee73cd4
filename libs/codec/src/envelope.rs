//! Request envelope: `[correlation id:16][opcode:i32 BE][field]*`
//!
//! The envelope is the unit of transport. A client builds it once per
//! logical call and resends the same bytes on every retry, so the
//! correlation id and the field payload never change across attempts.

use crate::builder::WireWriter;
use crate::error::{ProtocolError, ProtocolResult};
use crate::parser::WireReader;
use crate::request::Request;
use bytes::Bytes;
use types::{CorrelationId, Opcode, CORRELATION_ID_LEN, ENVELOPE_HEADER_LEN, MAX_DATAGRAM_SIZE};

/// Fixed-width prefix of every request datagram
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub correlation_id: CorrelationId,
    pub opcode: Opcode,
}

/// A request ready to be put on the wire
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub correlation_id: CorrelationId,
    pub request: Request,
}

impl Envelope {
    /// Wrap a request under a freshly generated correlation id
    pub fn new(request: Request) -> Self {
        Self {
            correlation_id: CorrelationId::generate(),
            request,
        }
    }

    pub fn with_id(correlation_id: CorrelationId, request: Request) -> Self {
        Self {
            correlation_id,
            request,
        }
    }

    pub fn header(&self) -> EnvelopeHeader {
        EnvelopeHeader {
            correlation_id: self.correlation_id,
            opcode: self.request.opcode(),
        }
    }

    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let mut writer = WireWriter::with_capacity(64);
        writer
            .put_raw(self.correlation_id.as_bytes())
            .put_i32(self.request.opcode().code());
        self.request.write_fields(&mut writer);

        if writer.len() > MAX_DATAGRAM_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: writer.len(),
                max: MAX_DATAGRAM_SIZE,
            });
        }
        Ok(writer.finish())
    }

    /// Decode a full request datagram
    pub fn decode(buf: &[u8]) -> ProtocolResult<Self> {
        let (header, mut reader) = parse_header(buf)?;
        let request = Request::read_fields(header.opcode, &mut reader)?;
        Ok(Self {
            correlation_id: header.correlation_id,
            request,
        })
    }
}

/// Decode the correlation id and opcode, leaving a reader positioned at the first field
///
/// Unknown opcodes and the server-internal cached-reply sentinel are
/// framing errors: no client may send them.
pub fn parse_header(buf: &[u8]) -> ProtocolResult<(EnvelopeHeader, WireReader<'_>)> {
    if buf.len() < ENVELOPE_HEADER_LEN {
        return Err(ProtocolError::message_too_small(
            ENVELOPE_HEADER_LEN,
            buf.len(),
            "envelope header",
        ));
    }

    let mut reader = WireReader::new(buf);
    let id_bytes = reader.read_fixed(CORRELATION_ID_LEN)?;
    let correlation_id = CorrelationId::from_slice(id_bytes).ok_or_else(|| {
        ProtocolError::message_too_small(CORRELATION_ID_LEN, id_bytes.len(), "correlation id")
    })?;

    let raw_opcode = reader.read_i32()?;
    let opcode = Opcode::try_from(raw_opcode)?;
    if !opcode.is_client_visible() {
        return Err(ProtocolError::ReservedOpcode { opcode: raw_opcode });
    }

    Ok((
        EnvelopeHeader {
            correlation_id,
            opcode,
        },
        reader,
    ))
}
