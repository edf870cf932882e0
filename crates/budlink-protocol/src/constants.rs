//! Protocol constants
//!
//! These constants define the message-type ids, frame delimiters, and other
//! protocol-specific values used on the earbud case's RFCOMM serial channel.

// ============================================================================
// Frame delimiters and header layout
// ============================================================================

/// Start-of-message marker, first byte of every frame.
pub const START_OF_MESSAGE: u8 = 0xFD;
/// End-of-message marker, last byte of every frame.
pub const END_OF_MESSAGE: u8 = 0xDD;

/// Low 10 bits of the header: payload length including the checksum trailer.
pub const HEADER_LENGTH_MASK: u16 = 0x03FF;
/// Header bit set on frames sent in response to a request.
pub const HEADER_FLAG_RESPONSE: u16 = 0x1000;
/// Header bit set on fragmented frames (reassembly is not supported).
pub const HEADER_FLAG_FRAGMENT: u16 = 0x2000;

/// Bytes of framing around the payload: SOM + 2-byte header + EOM.
pub const FRAME_OVERHEAD: usize = 4;
/// Size of the checksum trailer at the end of every payload.
pub const CHECKSUM_SIZE: usize = 2;

// ============================================================================
// Message ids (shared by requests and responses)
// ============================================================================

/// Factory-reset the earbuds.
pub const MSG_ID_RESET: u8 = 0x50;
/// Basic status update (battery and wearing state only).
pub const MSG_ID_STATUS_UPDATED: u8 = 0x60;
/// Full status update; field set grows with the firmware revision byte.
pub const MSG_ID_EXTENDED_STATUS_UPDATED: u8 = 0x61;
/// Hardware/software/touch firmware version report.
pub const MSG_ID_VERSION_INFO: u8 = 0x63;
/// Build string of the installed firmware.
pub const MSG_ID_DEBUG_BUILD_INFO: u8 = 0x28;
/// Serial numbers of both earbuds.
pub const MSG_ID_DEBUG_SERIAL_NUMBER: u8 = 0x29;
/// Enable or disable ambient sound passthrough.
pub const MSG_ID_SET_AMBIENT_MODE: u8 = 0x80;
/// Ambient sound passthrough volume.
pub const MSG_ID_AMBIENT_VOLUME: u8 = 0x84;
/// Keep media volume in sync while ambient sound is active.
pub const MSG_ID_ADJUST_SOUND_SYNC: u8 = 0x85;
/// Select the active equalizer preset.
pub const MSG_ID_EQUALIZER: u8 = 0x86;
/// Handshake sent by the manager application after connecting.
pub const MSG_ID_MANAGER_INFO: u8 = 0x88;
/// Enable or disable the touchpads.
pub const MSG_ID_LOCK_TOUCHPAD: u8 = 0x90;
/// Assign the touch-and-hold action per earbud.
pub const MSG_ID_SET_TOUCHPAD_OPTION: u8 = 0x92;
/// Relay the wearer's own voice while on a call.
pub const MSG_ID_SIDETONE: u8 = 0x93;
/// Double-tap on the earbud edge for volume control.
pub const MSG_ID_OUTSIDE_DOUBLE_TAP: u8 = 0x95;
/// Boosted ambient sound amplification.
pub const MSG_ID_EXTRA_HIGH_AMBIENT: u8 = 0x96;
/// Start playing the find-my-earbuds chirp.
pub const MSG_ID_FIND_MY_EARBUDS_START: u8 = 0xA0;
/// Stop the find-my-earbuds chirp.
pub const MSG_ID_FIND_MY_EARBUDS_STOP: u8 = 0xA1;
/// Mute one earbud while the chirp is playing.
pub const MSG_ID_MUTE_EARBUD: u8 = 0xA2;
/// Per-component firmware versions reported during an update check.
pub const MSG_ID_FOTA_DEVICE_INFO_SW_VERSION: u8 = 0xA7;

// ============================================================================
// Software version synthesis
// ============================================================================

/// Key prefix for per-component firmware version fields; the component's
/// one-character identifier is appended.
pub const FOTA_SW_VERSION_PREFIX: &str = "fota_sw_version_";

/// Year letters for the software version string, indexed by the high nibble
/// of the year/month byte.
pub const SW_YEAR_LETTERS: [&str; 16] = [
    "M", "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z", "A", "B",
];

/// Month letters for the software version string, indexed by the low nibble
/// of the year/month byte.
pub const SW_MONTH_LETTERS: [&str; 16] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P",
];

/// Release letters for release indicator values 16 and above, indexed at
/// `value - 16`. Values below 16 are rendered as a single hex digit instead.
pub const SW_RELEASE_LETTERS: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
