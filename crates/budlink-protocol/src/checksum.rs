//! Payload checksum.
//!
//! Every payload carries a CRC-16/XMODEM trailer (polynomial 0x1021, initial
//! value 0, no reflection, no final XOR) stored little-endian after the data.

use crc::{Crc, CRC_16_XMODEM};

use crate::constants::CHECKSUM_SIZE;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// Compute the checksum over a byte sequence.
pub fn compute(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

/// Verify a payload that ends with its 2-byte little-endian checksum.
///
/// Returns false for payloads too short to carry the trailer.
pub fn verify(payload: &[u8]) -> bool {
    let Some(body_len) = payload.len().checked_sub(CHECKSUM_SIZE) else {
        return false;
    };
    let expected = u16::from_le_bytes([payload[body_len], payload[body_len + 1]]);
    compute(&payload[..body_len]) == expected
}

/// Split a payload into its body and its expected checksum value.
///
/// Returns `None` for payloads too short to carry the trailer.
pub fn split(payload: &[u8]) -> Option<(&[u8], u16)> {
    let body_len = payload.len().checked_sub(CHECKSUM_SIZE)?;
    let expected = u16::from_le_bytes([payload[body_len], payload[body_len + 1]]);
    Some((&payload[..body_len], expected))
}
