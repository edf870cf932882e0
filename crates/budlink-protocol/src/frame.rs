//! Frame delimiting and assembly.
//!
//! Every frame on the wire is:
//!
//! ```text
//! +-----+--------+--------+----+-----------+--------+--------+-----+
//! | SOM | hdr_lo | hdr_hi | id | data      | crc_lo | crc_hi | EOM |
//! +-----+--------+--------+----+-----------+--------+--------+-----+
//! ```
//!
//! The 2-byte header is little-endian: its 10 low bits carry the payload
//! length (id + data + checksum trailer), bit 0x1000 marks a response, and
//! bit 0x2000 marks a fragmented frame. The checksum covers `[id, data..]`.
//!
//! Decoding scans an accumulated buffer frame by frame. A rejected frame is
//! abandoned and scanning resumes at the next buffer position; this
//! resynchronization is best-effort and can lose data against arbitrary
//! corruption, since the wire format has no byte stuffing to fall back on.

use bytes::{Buf, BytesMut};

use crate::checksum;
use crate::constants::*;
use crate::error::{EncodeError, FrameError};
use crate::registry::Registry;

/// Longest data slice that still fits the 10-bit header length together with
/// the message id and the checksum trailer.
pub const MAX_DATA_SIZE: usize = HEADER_LENGTH_MASK as usize - 1 - CHECKSUM_SIZE;

/// One complete delimited frame, stripped of its markers and header.
///
/// Frames are transient: decoded, verified, dispatched, dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Vec<u8>,
    /// Whether the header's response bit was set.
    pub is_response: bool,
}

impl Frame {
    /// The full payload: message id, data, and checksum trailer.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The message-type id, the first payload byte.
    pub fn message_id(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// The payload without its checksum trailer: id + data.
    pub fn body(&self) -> &[u8] {
        let len = self.payload.len().saturating_sub(CHECKSUM_SIZE);
        &self.payload[..len]
    }

    /// Check the trailing checksum against the payload.
    pub fn verify_checksum(&self) -> bool {
        checksum::verify(&self.payload)
    }
}

/// A codec for delimiting frames within received data.
///
/// Push received bytes in, then drain frames with [`FrameCodec::decode_next`]
/// until it returns `None`.
#[derive(Debug, Default)]
pub struct FrameCodec {
    /// Buffer for accumulating incoming data.
    buffer: BytesMut,
}

impl FrameCodec {
    /// Create a new frame codec.
    pub fn new() -> Self {
        FrameCodec {
            buffer: BytesMut::new(),
        }
    }

    /// Add received data to the buffer.
    pub fn push(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Get the number of buffered bytes.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Clear the buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Decode the next frame at the read cursor.
    ///
    /// Returns `None` once the buffer is exhausted. A rejected frame advances
    /// the cursor by a single byte so scanning can resynchronize on whatever
    /// follows; a fragmented frame is skipped whole, since its length field
    /// is still trustworthy.
    pub fn decode_next(&mut self) -> Option<Result<Frame, FrameError>> {
        if self.buffer.is_empty() {
            return None;
        }

        if self.buffer[0] != START_OF_MESSAGE {
            let found = self.buffer[0];
            self.buffer.advance(1);
            return Some(Err(FrameError::InvalidStart { found }));
        }

        // SOM plus the 2-byte header.
        if self.buffer.len() < 3 {
            let actual = self.buffer.len();
            self.buffer.advance(1);
            return Some(Err(FrameError::Truncated { expected: 3, actual }));
        }

        let header = u16::from_le_bytes([self.buffer[1], self.buffer[2]]);
        let size = (header & HEADER_LENGTH_MASK) as usize;
        let total = 3 + size + 1;

        if header & HEADER_FLAG_FRAGMENT != 0 {
            let skip = total.min(self.buffer.len());
            self.buffer.advance(skip);
            return Some(Err(FrameError::UnsupportedFragmentation));
        }

        if self.buffer.len() < total {
            let actual = self.buffer.len();
            self.buffer.advance(1);
            return Some(Err(FrameError::Truncated {
                expected: total,
                actual,
            }));
        }

        let end = self.buffer[3 + size];
        if end != END_OF_MESSAGE {
            self.buffer.advance(1);
            return Some(Err(FrameError::InvalidEnd { found: end }));
        }

        self.buffer.advance(3);
        let payload = self.buffer.split_to(size).to_vec();
        self.buffer.advance(1);

        Some(Ok(Frame {
            payload,
            is_response: header & HEADER_FLAG_RESPONSE != 0,
        }))
    }
}

/// Wrap a payload (message id + data) into a complete frame.
pub fn wrap_payload(payload: &[u8]) -> Result<Vec<u8>, EncodeError> {
    if payload.len() > MAX_DATA_SIZE + 1 {
        return Err(EncodeError::PayloadTooLong {
            max: MAX_DATA_SIZE + 1,
            actual: payload.len(),
        });
    }

    let size = (payload.len() + CHECKSUM_SIZE) as u16;
    let crc = checksum::compute(payload);

    let mut frame = Vec::with_capacity(FRAME_OVERHEAD + size as usize);
    frame.push(START_OF_MESSAGE);
    frame.extend_from_slice(&size.to_le_bytes());
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&crc.to_le_bytes());
    frame.push(END_OF_MESSAGE);
    Ok(frame)
}

/// Encode a complete frame for a symbolic message name and raw argument
/// bytes.
pub fn encode_frame(registry: &Registry, name: &str, data: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let payload = crate::commands::encode_payload(registry, name, data)?;
    wrap_payload(&payload)
}
