//! Receive-side session: frames in, an accumulating status record out.
//!
//! A session owns the frame codec and the status record for one
//! connect/read/report cycle. Feeding it received bytes drives the full
//! decode pipeline: delimiting, checksum verification, payload decoding, and
//! merging the decoded fields into the status. Bad frames never end the
//! cycle; they are counted, surfaced to the caller, and scanning continues
//! with the rest of the buffer.

use crate::checksum;
use crate::decode::{self, DecodedMessage, FieldMap, Value};
use crate::error::{DecodeError, ProtocolError};
use crate::frame::{Frame, FrameCodec};
use crate::registry::Registry;

/// Decode counters for one session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames that passed verification and decoded.
    pub frames_accepted: usize,
    /// Frames dropped for framing, checksum, or decode errors.
    pub frames_rejected: usize,
    /// Accepted frames whose type has no field decoder.
    pub messages_undecoded: usize,
}

/// The device state assembled from successive status frames.
///
/// Each decoded message's fields merge in; a field written twice keeps the
/// later value. Owned by the caller, lives for one read/report cycle.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DeviceStatus {
    fields: FieldMap,
}

impl DeviceStatus {
    /// Merge a decoded message's fields into the status.
    pub fn apply(&mut self, message: DecodedMessage) {
        self.fields.merge(message.fields);
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter()
    }

    /// Whether any field has been decoded yet.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of decoded fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

/// One decode session over the byte stream.
#[derive(Debug)]
pub struct Session {
    registry: Registry,
    codec: FrameCodec,
    status: DeviceStatus,
    stats: SessionStats,
}

impl Session {
    /// Create a session around a registry.
    pub fn new(registry: Registry) -> Self {
        Session {
            registry,
            codec: FrameCodec::new(),
            status: DeviceStatus::default(),
            stats: SessionStats::default(),
        }
    }

    /// The registry this session resolves against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Feed received bytes and decode every frame they complete.
    ///
    /// Returns the errors encountered along the way; none of them is fatal
    /// to the session, and all decodable frames in the buffer have been
    /// applied by the time this returns.
    pub fn feed(&mut self, data: &[u8]) -> Vec<ProtocolError> {
        self.codec.push(data);

        let mut errors = Vec::new();
        while let Some(result) = self.codec.decode_next() {
            let error = match result {
                Ok(frame) => match self.accept(frame) {
                    Ok(()) => continue,
                    Err(e) => e,
                },
                Err(e) => e.into(),
            };
            log::debug!("skipping frame: {error}");
            self.stats.frames_rejected += 1;
            errors.push(error);
        }
        errors
    }

    fn accept(&mut self, frame: Frame) -> Result<(), ProtocolError> {
        let (body, expected) = checksum::split(frame.payload()).ok_or(DecodeError::Truncated {
            expected: 2,
            actual: frame.payload().len(),
        })?;

        let computed = checksum::compute(body);
        if computed != expected {
            return Err(DecodeError::ChecksumMismatch { expected, computed }.into());
        }

        let message = decode::decode(&self.registry, body)?;
        if message.fields.is_empty() {
            log::debug!("message {} carries no decoded fields", message.name);
            self.stats.messages_undecoded += 1;
        }

        self.stats.frames_accepted += 1;
        self.status.apply(message);
        Ok(())
    }

    /// The status accumulated so far.
    pub fn status(&self) -> &DeviceStatus {
        &self.status
    }

    /// Hand the accumulated status to the caller, leaving an empty one.
    pub fn take_status(&mut self) -> DeviceStatus {
        std::mem::take(&mut self.status)
    }

    /// Decode counters so far.
    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Drop all buffered bytes, status fields, and counters.
    pub fn reset(&mut self) {
        self.codec.clear();
        self.status = DeviceStatus::default();
        self.stats = SessionStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;
    use crate::frame::wrap_payload;
    use crate::registry::Resolved;

    fn status_frame(revision_fields: &[u8]) -> Vec<u8> {
        let mut body = vec![MSG_ID_EXTENDED_STATUS_UPDATED];
        body.extend_from_slice(revision_fields);
        wrap_payload(&body).unwrap()
    }

    /// revision 2 status with the given battery levels.
    fn rev2_frame(battery_left: u8, battery_right: u8) -> Vec<u8> {
        status_frame(&[2, 0, battery_left, battery_right, 1, 0, 3, 1, 0x12])
    }

    #[test]
    fn test_feed_accumulates_fields() {
        let mut session = Session::new(Registry::new());

        let errors = session.feed(&rev2_frame(80, 75));
        assert!(errors.is_empty());
        assert_eq!(session.stats().frames_accepted, 1);
        assert_eq!(session.status().get("battery_left"), Some(&Value::U8(80)));
        assert_eq!(
            session.status().get("equalizer_type"),
            Some(&Value::Symbol(Resolved::Known("dynamic")))
        );
    }

    #[test]
    fn test_later_frame_overwrites_fields() {
        let mut session = Session::new(Registry::new());

        session.feed(&rev2_frame(80, 75));
        session.feed(&rev2_frame(79, 74));

        assert_eq!(session.stats().frames_accepted, 2);
        assert_eq!(session.status().get("battery_left"), Some(&Value::U8(79)));
        assert_eq!(session.status().get("battery_right"), Some(&Value::U8(74)));
    }

    #[test]
    fn test_checksum_mismatch_rejected_not_fatal() {
        let mut session = Session::new(Registry::new());

        let mut corrupted = rev2_frame(80, 75);
        corrupted[5] ^= 0x40; // flip a data bit, framing stays intact

        let errors = session.feed(&corrupted);
        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ProtocolError::Decode(DecodeError::ChecksumMismatch { .. })
        ));
        assert_eq!(session.stats().frames_rejected, 1);
        assert!(session.status().is_empty());

        // The session keeps working afterwards.
        let errors = session.feed(&rev2_frame(60, 61));
        assert!(errors.is_empty());
        assert_eq!(session.status().get("battery_left"), Some(&Value::U8(60)));
    }

    #[test]
    fn test_garbage_between_frames() {
        let mut session = Session::new(Registry::new());

        let mut data = vec![0x00, 0x13];
        data.extend_from_slice(&rev2_frame(50, 51));

        let errors = session.feed(&data);
        assert_eq!(errors.len(), 2); // one per garbage byte
        assert_eq!(session.stats().frames_accepted, 1);
        assert_eq!(session.status().get("battery_left"), Some(&Value::U8(50)));
    }

    #[test]
    fn test_undecoded_message_counted() {
        let mut session = Session::new(Registry::new());

        let frame = wrap_payload(&[MSG_ID_MANAGER_INFO, 0x01]).unwrap();
        let errors = session.feed(&frame);

        assert!(errors.is_empty());
        assert_eq!(session.stats().frames_accepted, 1);
        assert_eq!(session.stats().messages_undecoded, 1);
        assert!(session.status().is_empty());
    }

    #[test]
    fn test_unknown_type_rejected() {
        let mut session = Session::new(Registry::new());

        let frame = wrap_payload(&[0x7E, 0x01]).unwrap();
        let errors = session.feed(&frame);

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            ProtocolError::Decode(DecodeError::UnknownMessageType(0x7E))
        ));
        assert!(session.status().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut session = Session::new(Registry::new());
        session.feed(&rev2_frame(80, 75));
        session.reset();

        assert!(session.status().is_empty());
        assert_eq!(session.stats(), SessionStats::default());
    }
}
