//! Symbolic lookup tables.
//!
//! The registry maps numeric protocol codes to symbolic names and back, one
//! independent table per namespace. It is fixed data: built once at startup,
//! never mutated, and shared by reference into every decode and encode call.
//!
//! Codes outside a table are not an error. They resolve to
//! [`Resolved::Unknown`], which keeps the raw value and renders numerically,
//! so firmware newer than these tables degrades to numeric output instead of
//! failing.

use std::fmt;

use crate::constants::*;

/// One symbolic lookup table within the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Namespace {
    /// Message-type ids.
    MessageId,
    /// Equalizer presets.
    EqualizerMode,
    /// Touch-and-hold actions.
    TouchpadOption,
    /// Earbud shell colors.
    EarbudColor,
}

/// Result of a code-to-name resolution.
///
/// Unmatched codes are carried as `Unknown` rather than silently reused as
/// names, so callers can never mistake an unresolved code for a valid name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved {
    /// The code is in the table.
    Known(&'static str),
    /// The code is not in the table; the raw value is preserved.
    Unknown(u16),
}

impl Resolved {
    /// The resolved name, if the code was in the table.
    pub fn as_known(&self) -> Option<&'static str> {
        match self {
            Resolved::Known(name) => Some(name),
            Resolved::Unknown(_) => None,
        }
    }

    /// Whether the code resolved to a name.
    pub fn is_known(&self) -> bool {
        matches!(self, Resolved::Known(_))
    }
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::Known(name) => f.write_str(name),
            Resolved::Unknown(code) => write!(f, "unknown (0x{code:02X})"),
        }
    }
}

static MESSAGE_IDS: &[(u16, &str)] = &[
    (MSG_ID_DEBUG_BUILD_INFO as u16, "DEBUG_BUILD_INFO"),
    (MSG_ID_DEBUG_SERIAL_NUMBER as u16, "DEBUG_SERIAL_NUMBER"),
    (MSG_ID_RESET as u16, "RESET"),
    (MSG_ID_STATUS_UPDATED as u16, "STATUS_UPDATED"),
    (MSG_ID_EXTENDED_STATUS_UPDATED as u16, "EXTENDED_STATUS_UPDATED"),
    (MSG_ID_VERSION_INFO as u16, "VERSION_INFO"),
    (MSG_ID_SET_AMBIENT_MODE as u16, "SET_AMBIENT_MODE"),
    (MSG_ID_AMBIENT_VOLUME as u16, "AMBIENT_VOLUME"),
    (MSG_ID_ADJUST_SOUND_SYNC as u16, "ADJUST_SOUND_SYNC"),
    (MSG_ID_EQUALIZER as u16, "EQUALIZER"),
    (MSG_ID_MANAGER_INFO as u16, "MANAGER_INFO"),
    (MSG_ID_LOCK_TOUCHPAD as u16, "LOCK_TOUCHPAD"),
    (MSG_ID_SET_TOUCHPAD_OPTION as u16, "SET_TOUCHPAD_OPTION"),
    (MSG_ID_SIDETONE as u16, "SIDETONE"),
    (MSG_ID_OUTSIDE_DOUBLE_TAP as u16, "OUTSIDE_DOUBLE_TAP"),
    (MSG_ID_EXTRA_HIGH_AMBIENT as u16, "EXTRA_HIGH_AMBIENT"),
    (MSG_ID_FIND_MY_EARBUDS_START as u16, "FIND_MY_EARBUDS_START"),
    (MSG_ID_FIND_MY_EARBUDS_STOP as u16, "FIND_MY_EARBUDS_STOP"),
    (MSG_ID_MUTE_EARBUD as u16, "MUTE_EARBUD"),
    (
        MSG_ID_FOTA_DEVICE_INFO_SW_VERSION as u16,
        "FOTA_DEVICE_INFO_SW_VERSION",
    ),
];

static EQUALIZER_MODES: &[(u16, &str)] = &[
    (0, "off"),
    (1, "bass-boost"),
    (2, "soft"),
    (3, "dynamic"),
    (4, "clear"),
    (5, "treble-boost"),
];

static TOUCHPAD_OPTIONS: &[(u16, &str)] = &[
    (0, "none"),
    (1, "voice-command"),
    (2, "ambient-sound"),
    (3, "volume"),
    (4, "spotify"),
];

static EARBUD_COLORS: &[(u16, &str)] = &[
    (1, "white"),
    (2, "black"),
    (3, "red"),
    (4, "blue"),
    (5, "pink"),
    (6, "cloud-blue"),
    (7, "deep-blue"),
    (8, "copper-brown"),
];

/// The process-wide set of lookup tables.
///
/// Cheap to construct and copy; all table data is static.
#[derive(Debug, Clone, Copy)]
pub struct Registry {
    message_ids: &'static [(u16, &'static str)],
    equalizer_modes: &'static [(u16, &'static str)],
    touchpad_options: &'static [(u16, &'static str)],
    earbud_colors: &'static [(u16, &'static str)],
    sw_years: &'static [&'static str; 16],
    sw_months: &'static [&'static str; 16],
    sw_releases: &'static [&'static str],
}

impl Registry {
    /// Build the registry from its fixed tables.
    pub const fn new() -> Self {
        Registry {
            message_ids: MESSAGE_IDS,
            equalizer_modes: EQUALIZER_MODES,
            touchpad_options: TOUCHPAD_OPTIONS,
            earbud_colors: EARBUD_COLORS,
            sw_years: &SW_YEAR_LETTERS,
            sw_months: &SW_MONTH_LETTERS,
            sw_releases: &SW_RELEASE_LETTERS,
        }
    }

    fn table(&self, namespace: Namespace) -> &'static [(u16, &'static str)] {
        match namespace {
            Namespace::MessageId => self.message_ids,
            Namespace::EqualizerMode => self.equalizer_modes,
            Namespace::TouchpadOption => self.touchpad_options,
            Namespace::EarbudColor => self.earbud_colors,
        }
    }

    /// Resolve a numeric code to its symbolic name.
    pub fn resolve_name(&self, namespace: Namespace, code: u16) -> Resolved {
        self.table(namespace)
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, name)| Resolved::Known(name))
            .unwrap_or(Resolved::Unknown(code))
    }

    /// Resolve a symbolic name back to its numeric code.
    pub fn resolve_code(&self, namespace: Namespace, name: &str) -> Option<u16> {
        self.table(namespace)
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(code, _)| *code)
    }

    /// Year letter of the software version string, from the high nibble of
    /// the year/month byte.
    pub fn sw_year_letter(&self, nibble: u8) -> &'static str {
        self.sw_years[(nibble & 0x0F) as usize]
    }

    /// Month letter of the software version string, from the low nibble of
    /// the year/month byte.
    pub fn sw_month_letter(&self, nibble: u8) -> &'static str {
        self.sw_months[(nibble & 0x0F) as usize]
    }

    /// Release letter for release indicator values 16 and above.
    pub fn sw_release_letter(&self, index: usize) -> Option<&'static str> {
        self.sw_releases.get(index).copied()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}
