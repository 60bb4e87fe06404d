//! Protocol codec
//!
//! Framing plus bincode payload encoding.
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬──────────┬──────────┬─────────────────────────────┐
//! │ Kind (1) │ Len (4)  │ CRC (4)  │         Payload             │
//! └──────────┴──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use crate::error::{StoreError, StoreResult};
use super::{Request, Response};

/// Header size: 1 byte kind + 4 bytes length + 4 bytes CRC32
pub const HEADER_SIZE: usize = 9;

/// Maximum payload size (64 MB), comfortably above the default 8 MB chunk
pub const MAX_PAYLOAD_SIZE: u32 = 64 * 1024 * 1024;

/// Largest file chunk; two full chunk rows must fit one scan page reply
pub const MAX_CHUNK_SIZE: usize = (MAX_PAYLOAD_SIZE / 4) as usize;

/// Frame kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    Request = 0x01,
    Response = 0x02,
}

impl FrameKind {
    fn from_byte(byte: u8) -> StoreResult<Self> {
        match byte {
            0x01 => Ok(FrameKind::Request),
            0x02 => Ok(FrameKind::Response),
            _ => Err(StoreError::Protocol(format!(
                "Unknown frame kind: 0x{:02x}",
                byte
            ))),
        }
    }
}

// =============================================================================
// Frame Encoding/Decoding
// =============================================================================

/// Encode a payload into a frame
///
/// Format: kind (1) + payload_len (4) + crc32 (4) + payload
pub fn encode_frame(kind: FrameKind, payload: &[u8]) -> StoreResult<Vec<u8>> {
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.push(kind as u8);
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&crc32fast::hash(payload).to_be_bytes());
    frame.extend_from_slice(payload);

    Ok(frame)
}

/// Parse the header, returning kind, payload length and expected CRC
fn parse_header(header: &[u8]) -> StoreResult<(FrameKind, usize, u32)> {
    if header.len() < HEADER_SIZE {
        return Err(StoreError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            header.len()
        )));
    }

    let kind = FrameKind::from_byte(header[0])?;
    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]);
    let crc = u32::from_be_bytes([header[5], header[6], header[7], header[8]]);

    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    Ok((kind, payload_len as usize, crc))
}

fn verify_crc(payload: &[u8], expected: u32) -> StoreResult<()> {
    let actual = crc32fast::hash(payload);
    if actual != expected {
        return Err(StoreError::Protocol(format!(
            "Checksum mismatch: expected {:08x}, got {:08x}",
            expected, actual
        )));
    }
    Ok(())
}

/// Decode a frame from bytes
///
/// Returns the kind and a slice of the verified payload
pub fn decode_frame(bytes: &[u8]) -> StoreResult<(FrameKind, &[u8])> {
    let (kind, payload_len, crc) = parse_header(bytes)?;

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(StoreError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_SIZE..total_len];
    verify_crc(payload, crc)?;

    Ok((kind, payload))
}

fn expect_kind(actual: FrameKind, expected: FrameKind) -> StoreResult<()> {
    if actual != expected {
        return Err(StoreError::Protocol(format!(
            "Unexpected frame kind: expected {:?}, got {:?}",
            expected, actual
        )));
    }
    Ok(())
}

// =============================================================================
// Request / Response Encoding
// =============================================================================

/// Encode a request into a complete frame
pub fn encode_request(request: &Request) -> StoreResult<Vec<u8>> {
    let payload = bincode::serialize(request)?;
    encode_frame(FrameKind::Request, &payload)
}

/// Decode a request from a complete frame
pub fn decode_request(bytes: &[u8]) -> StoreResult<Request> {
    let (kind, payload) = decode_frame(bytes)?;
    expect_kind(kind, FrameKind::Request)?;
    Ok(bincode::deserialize(payload)?)
}

/// Encode a response into a complete frame
pub fn encode_response(response: &Response) -> StoreResult<Vec<u8>> {
    let payload = bincode::serialize(response)?;
    encode_frame(FrameKind::Response, &payload)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> StoreResult<Response> {
    let (kind, payload) = decode_frame(bytes)?;
    expect_kind(kind, FrameKind::Response)?;
    Ok(bincode::deserialize(payload)?)
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one frame's payload, blocking until it is complete
fn read_frame<R: Read>(reader: &mut R, expected: FrameKind) -> StoreResult<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let (kind, payload_len, crc) = parse_header(&header)?;
    expect_kind(kind, expected)?;

    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    verify_crc(&payload, crc)?;
    Ok(payload)
}

/// Read a complete request from a stream
pub fn read_request<R: Read>(reader: &mut R) -> StoreResult<Request> {
    let payload = read_frame(reader, FrameKind::Request)?;
    Ok(bincode::deserialize(&payload)?)
}

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request: &Request) -> StoreResult<()> {
    let bytes = encode_request(request)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> StoreResult<Response> {
    let payload = read_frame(reader, FrameKind::Response)?;
    Ok(bincode::deserialize(&payload)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> StoreResult<()> {
    let bytes = encode_response(response)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
