//! Commands that can be sent to the earbuds.
//!
//! The raw entry point is [`encode_payload`]: a symbolic message name plus
//! caller-supplied argument bytes. Arguments are passed through without any
//! schema validation; the wire format has none, so the caller owns their
//! count, order, and range. [`Command`] layers the known settings on top of
//! that, lowering each to its name and argument bytes.

use crate::error::EncodeError;
use crate::registry::{Namespace, Registry};

/// Encode a payload (message id + argument bytes) for a symbolic name.
pub fn encode_payload(registry: &Registry, name: &str, args: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let id = registry
        .resolve_code(Namespace::MessageId, name)
        .ok_or_else(|| EncodeError::UnknownMessageName(name.to_string()))?;

    let mut buf = Vec::with_capacity(1 + args.len());
    buf.push(id as u8);
    buf.extend_from_slice(args);
    Ok(buf)
}

/// Typed commands for the settings this tool can change or query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Handshake sent after connecting; the case answers with a full status
    /// update.
    ManagerInfo,

    /// Ask for hardware/software/touch firmware versions.
    VersionInfo,

    /// Enable or disable ambient sound passthrough.
    SetAmbientMode {
        /// Passthrough on or off.
        enabled: bool,
    },

    /// Set the ambient sound passthrough volume.
    SetAmbientVolume {
        /// Volume step, 0 to 3.
        level: u8,
    },

    /// Select the active equalizer preset.
    SetEqualizer {
        /// Preset code from the equalizer-mode table.
        mode: u8,
    },

    /// Enable or disable the touchpads.
    LockTouchpad {
        /// True locks both touchpads.
        enabled: bool,
    },

    /// Assign the touch-and-hold action per earbud.
    SetTouchpadOption {
        /// Action code for the left earbud.
        left: u8,
        /// Action code for the right earbud.
        right: u8,
    },

    /// Double-tap on the earbud edge for volume control.
    SetOutsideDoubleTap {
        /// Feature on or off.
        enabled: bool,
    },

    /// Relay the wearer's own voice while on a call.
    SetSideTone {
        /// Feature on or off.
        enabled: bool,
    },

    /// Boosted ambient sound amplification.
    SetExtraHighAmbient {
        /// Feature on or off.
        enabled: bool,
    },

    /// Start playing the find-my-earbuds chirp.
    FindMyEarbudsStart,

    /// Stop the find-my-earbuds chirp.
    FindMyEarbudsStop,

    /// Mute one or both earbuds while the chirp is playing.
    MuteEarbud {
        /// Mute the left earbud.
        left: bool,
        /// Mute the right earbud.
        right: bool,
    },

    /// Factory-reset the earbuds.
    Reset,
}

impl Command {
    /// The symbolic message name this command encodes as.
    pub fn name(&self) -> &'static str {
        match self {
            Command::ManagerInfo => "MANAGER_INFO",
            Command::VersionInfo => "VERSION_INFO",
            Command::SetAmbientMode { .. } => "SET_AMBIENT_MODE",
            Command::SetAmbientVolume { .. } => "AMBIENT_VOLUME",
            Command::SetEqualizer { .. } => "EQUALIZER",
            Command::LockTouchpad { .. } => "LOCK_TOUCHPAD",
            Command::SetTouchpadOption { .. } => "SET_TOUCHPAD_OPTION",
            Command::SetOutsideDoubleTap { .. } => "OUTSIDE_DOUBLE_TAP",
            Command::SetSideTone { .. } => "SIDETONE",
            Command::SetExtraHighAmbient { .. } => "EXTRA_HIGH_AMBIENT",
            Command::FindMyEarbudsStart => "FIND_MY_EARBUDS_START",
            Command::FindMyEarbudsStop => "FIND_MY_EARBUDS_STOP",
            Command::MuteEarbud { .. } => "MUTE_EARBUD",
            Command::Reset => "RESET",
        }
    }

    /// The argument bytes this command carries.
    pub fn args(&self) -> Vec<u8> {
        fn flag(enabled: bool) -> u8 {
            if enabled {
                1
            } else {
                0
            }
        }

        match self {
            Command::ManagerInfo
            | Command::VersionInfo
            | Command::FindMyEarbudsStart
            | Command::FindMyEarbudsStop
            | Command::Reset => Vec::new(),
            Command::SetAmbientMode { enabled } => vec![flag(*enabled)],
            Command::SetAmbientVolume { level } => vec![*level],
            Command::SetEqualizer { mode } => vec![*mode],
            Command::LockTouchpad { enabled } => vec![flag(*enabled)],
            Command::SetTouchpadOption { left, right } => vec![*left, *right],
            Command::SetOutsideDoubleTap { enabled } => vec![flag(*enabled)],
            Command::SetSideTone { enabled } => vec![flag(*enabled)],
            Command::SetExtraHighAmbient { enabled } => vec![flag(*enabled)],
            Command::MuteEarbud { left, right } => vec![flag(*left), flag(*right)],
        }
    }

    /// Encode this command as a complete frame, ready for transmission.
    pub fn encode(&self, registry: &Registry) -> Result<Vec<u8>, EncodeError> {
        crate::frame::encode_frame(registry, self.name(), &self.args())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::*;

    #[test]
    fn test_encode_payload_passthrough() {
        let registry = Registry::new();
        let payload = encode_payload(&registry, "SET_TOUCHPAD_OPTION", &[0x01, 0x03]).unwrap();
        assert_eq!(payload, vec![MSG_ID_SET_TOUCHPAD_OPTION, 0x01, 0x03]);
    }

    #[test]
    fn test_encode_payload_no_args() {
        let registry = Registry::new();
        let payload = encode_payload(&registry, "MANAGER_INFO", &[]).unwrap();
        assert_eq!(payload, vec![MSG_ID_MANAGER_INFO]);
    }

    #[test]
    fn test_encode_payload_unknown_name() {
        let registry = Registry::new();
        let err = encode_payload(&registry, "BOGUS", &[]).unwrap_err();
        assert_eq!(err, EncodeError::UnknownMessageName("BOGUS".into()));
    }

    #[test]
    fn test_command_lowering() {
        assert_eq!(Command::LockTouchpad { enabled: true }.args(), vec![1]);
        assert_eq!(Command::LockTouchpad { enabled: false }.args(), vec![0]);
        assert_eq!(
            Command::SetTouchpadOption { left: 1, right: 2 }.args(),
            vec![1, 2]
        );
        assert_eq!(Command::ManagerInfo.args(), Vec::<u8>::new());
    }

    #[test]
    fn test_command_frame() {
        let registry = Registry::new();
        let frame = Command::SetEqualizer { mode: 3 }.encode(&registry).unwrap();

        // SOM, header, id, mode, checksum, EOM.
        assert_eq!(frame.len(), 8);
        assert_eq!(frame[0], START_OF_MESSAGE);
        assert_eq!(frame[3], MSG_ID_EQUALIZER);
        assert_eq!(frame[4], 3);
        assert_eq!(frame[frame.len() - 1], END_OF_MESSAGE);
    }
}
