//! Protocol error types.

use thiserror::Error;

/// Errors raised while delimiting frames in a receive buffer.
///
/// All of these are local to a single frame: the session skips the offending
/// bytes and keeps scanning, so none of them ends a read cycle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The byte at the read cursor is not the start-of-message marker.
    #[error("invalid start-of-message byte: 0x{found:02X}")]
    InvalidStart {
        /// The byte found instead of the marker.
        found: u8,
    },

    /// The byte after the payload is not the end-of-message marker.
    #[error("invalid end-of-message byte: 0x{found:02X}")]
    InvalidEnd {
        /// The byte found instead of the marker.
        found: u8,
    },

    /// The buffer ends before the declared frame does.
    #[error("truncated frame: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes the complete frame would occupy.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// The header's fragment bit is set. Reassembly is not implemented, so
    /// the whole declared frame is skipped and reported.
    #[error("fragmented frames are not supported")]
    UnsupportedFragmentation,
}

/// Errors raised while decoding a verified payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The message-type id is not in the registry at all. Registered ids
    /// without a field-level decoder are not an error; they decode to an
    /// empty field set.
    #[error("unknown message type: 0x{0:02X}")]
    UnknownMessageType(u8),

    /// The payload ends before the fields its revision implies.
    #[error("truncated payload: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes needed to read the next field.
        expected: usize,
        /// Bytes actually present.
        actual: usize,
    },

    /// The checksum trailer does not match the payload. The payload is
    /// rejected, not retried.
    #[error("checksum mismatch: expected 0x{expected:04X}, computed 0x{computed:04X}")]
    ChecksumMismatch {
        /// Value carried in the trailer.
        expected: u16,
        /// Value computed over the payload.
        computed: u16,
    },
}

/// Errors raised while encoding a payload for transmission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The symbolic message name is not in the registry.
    #[error("unknown message name: {0}")]
    UnknownMessageName(String),

    /// The payload does not fit the header's 10-bit length field.
    #[error("payload too long: maximum {max} bytes, got {actual}")]
    PayloadTooLong {
        /// Maximum encodable payload length.
        max: usize,
        /// Actual payload length.
        actual: usize,
    },
}

/// Any protocol-level error, as surfaced by a session's decode loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Frame delimiting failed.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Payload decoding failed.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Payload encoding failed.
    #[error(transparent)]
    Encode(#[from] EncodeError),
}
