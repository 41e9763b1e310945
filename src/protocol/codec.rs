//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ### Request
//! ```text
//! opcode (1) | key_len (2) | key | [data_len (4) | data]
//! ```
//!
//! ### Response
//! ```text
//! status (1) | [data]
//! ```

use std::io::{BufRead, ErrorKind, Read, Write};

use bytes::{BufMut, Bytes, BytesMut};

use super::{Op, ProtocolVersion, Response, DATA_FOLLOWS};
use crate::error::{CodecError, StoreError};

/// Opcode byte + key length field
pub const REQUEST_HEADER_SIZE: usize = 3;

/// Size of the data length field of a PUT
pub const DATA_LEN_SIZE: usize = 4;

/// Largest key the 2-byte length field can describe
pub const MAX_KEY_LEN: usize = u16::MAX as usize;

/// Largest value the 4-byte length field can describe
pub const MAX_VALUE_LEN: usize = u32::MAX as usize;

/// Capacity of a connection's read buffer
pub const READ_CHUNK_SIZE: usize = 8192;

/// A decoded request frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub op: Op,
    pub key: Vec<u8>,
    pub value: Option<Vec<u8>>,
}

// =============================================================================
// Request Encoding/Decoding
// =============================================================================

/// Encode a request frame
///
/// `value` must be given for PUT and omitted otherwise.
pub fn encode_request(
    version: ProtocolVersion,
    op: Op,
    key: &[u8],
    value: Option<&[u8]>,
) -> Result<Bytes, CodecError> {
    let opcode = version
        .opcodes()
        .encode(op)
        .ok_or_else(|| CodecError::UnsupportedOp(format!("{} under {}", op, version)))?;

    if !key.is_ascii() {
        return Err(CodecError::NonAsciiKey);
    }
    if key.len() > MAX_KEY_LEN {
        return Err(CodecError::KeyTooLong(key.len()));
    }

    let value = match (op.has_data(), value) {
        (true, Some(value)) => Some(value),
        (true, None) => return Err(CodecError::MissingValue(op.command)),
        (false, Some(_)) => return Err(CodecError::UnexpectedValue(op.command)),
        (false, None) => None,
    };
    if let Some(value) = value {
        if value.len() > MAX_VALUE_LEN {
            return Err(CodecError::ValueTooLong(value.len()));
        }
    }

    let data_size = value.map_or(0, |v| DATA_LEN_SIZE + v.len());
    let mut frame = BytesMut::with_capacity(REQUEST_HEADER_SIZE + key.len() + data_size);
    frame.put_u8(opcode);
    frame.put_u16(key.len() as u16);
    frame.put_slice(key);
    if let Some(value) = value {
        frame.put_u32(value.len() as u32);
        frame.put_slice(value);
    }

    Ok(frame.freeze())
}

/// Decode a request frame
///
/// Inverse of `encode_request`; trailing bytes past the frame are rejected.
pub fn decode_request(version: ProtocolVersion, bytes: &[u8]) -> Result<Request, CodecError> {
    if bytes.len() < REQUEST_HEADER_SIZE {
        return Err(CodecError::MalformedRequest(format!(
            "Incomplete header: expected {} bytes, got {}",
            REQUEST_HEADER_SIZE,
            bytes.len()
        )));
    }

    let opcode = bytes[0];
    let op = version
        .opcodes()
        .decode(opcode)
        .ok_or(CodecError::UnknownOpcode(opcode))?;

    let key_len = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;
    let key_end = REQUEST_HEADER_SIZE + key_len;
    if bytes.len() < key_end {
        return Err(CodecError::MalformedRequest(format!(
            "Incomplete key: expected {} bytes, got {}",
            key_len,
            bytes.len() - REQUEST_HEADER_SIZE
        )));
    }
    let key = bytes[REQUEST_HEADER_SIZE..key_end].to_vec();

    if !op.has_data() {
        if bytes.len() > key_end {
            return Err(CodecError::MalformedRequest(format!(
                "{} trailing bytes after {:?} request",
                bytes.len() - key_end,
                op.command
            )));
        }
        return Ok(Request { op, key, value: None });
    }

    let data_start = key_end + DATA_LEN_SIZE;
    if bytes.len() < data_start {
        return Err(CodecError::MalformedRequest(
            "PUT request: missing data length".to_string(),
        ));
    }
    let data_len = u32::from_be_bytes([
        bytes[key_end],
        bytes[key_end + 1],
        bytes[key_end + 2],
        bytes[key_end + 3],
    ]) as usize;

    let available = bytes.len() - data_start;
    if available != data_len {
        return Err(CodecError::MalformedRequest(format!(
            "PUT request: data length {} but {} bytes present",
            data_len, available
        )));
    }

    Ok(Request {
        op,
        key,
        value: Some(bytes[data_start..].to_vec()),
    })
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response frame
///
/// Sets the data-follows bit when `data` is given.
pub fn encode_response(status_code: u8, data: Option<&[u8]>) -> Bytes {
    let mut frame = BytesMut::with_capacity(1 + data.map_or(0, |d| d.len()));
    match data {
        Some(data) => {
            frame.put_u8(status_code | DATA_FOLLOWS);
            frame.put_slice(data);
        }
        None => frame.put_u8(status_code & !DATA_FOLLOWS),
    }
    frame.freeze()
}

/// Decode a response frame under the status table of `version`
pub fn decode_response(bytes: &[u8], version: ProtocolVersion) -> Result<Response, CodecError> {
    let (&status_byte, rest) = bytes
        .split_first()
        .ok_or_else(|| CodecError::MalformedResponse("empty response".to_string()))?;

    let table = version.statuses();
    let has_data = status_byte & DATA_FOLLOWS != 0;

    let data = if has_data {
        if rest.is_empty() {
            return Err(CodecError::MalformedResponse(format!(
                "status 0x{:02x} announces data but none follows",
                status_byte
            )));
        }
        Some(rest.to_vec())
    } else {
        None
    };

    Ok(Response {
        status: table.resolve(status_byte),
        code: table.code(status_byte),
        has_data,
        data,
    })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write an encoded request to a stream
pub fn write_request<W: Write>(writer: &mut W, frame: &[u8]) -> std::io::Result<()> {
    writer.write_all(frame)?;
    writer.flush()
}

/// Take every byte `reader` has available
///
/// Buffered bytes are always taken before the reader is asked for more.
/// Stops at EOF or when the reader reports `WouldBlock`/`TimedOut`, which
/// a connection arranges once the peer has gone quiet.
pub fn read_available<R: BufRead>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut data = Vec::new();
    loop {
        let n = match reader.fill_buf() {
            Ok(buf) => {
                data.extend_from_slice(buf);
                buf.len()
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => break,
            Err(e) => return Err(e),
        };
        if n == 0 {
            break;
        }
        reader.consume(n);
    }
    Ok(data)
}

/// Read one response from a stream
///
/// Responses carry no length field, so data runs until `read_available`
/// stops. On a blocking stream that stays open this waits for EOF or the
/// read timeout; `Connection::round_trip` bounds the wait instead.
pub fn read_response<R: BufRead>(
    reader: &mut R,
    version: ProtocolVersion,
) -> Result<Response, StoreError> {
    let mut status = [0u8; 1];
    reader.read_exact(&mut status)?;

    let mut frame = vec![status[0]];
    if status[0] & DATA_FOLLOWS != 0 {
        frame.extend(read_available(reader)?);
    }

    Ok(decode_response(&frame, version)?)
}
