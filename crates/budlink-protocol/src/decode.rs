//! Payload decoding.
//!
//! A verified payload body (message id + data, checksum already stripped) is
//! dispatched on its id byte and decoded into a set of named, typed fields.
//! Only a subset of message types has a field-level decoder; the rest of the
//! registered ids decode to an empty field set, which keeps partially
//! understood firmware traffic visible without failing on it.
//!
//! Fields inside a payload are strictly positional: there is no per-field
//! length or tag, and for status updates the set of present fields is gated
//! by a `revision` byte the firmware writes at the front of the data. Each
//! gated message type is therefore described as an ordered list of
//! (minimum revision, extractor) steps; supporting a newer revision means
//! appending steps, not adding branches.

use std::collections::BTreeMap;
use std::fmt;

use crate::constants::*;
use crate::error::DecodeError;
use crate::registry::{Namespace, Registry, Resolved};

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Raw unsigned byte.
    U8(u8),
    /// Raw unsigned 16-bit value.
    U16(u16),
    /// Flag byte, true iff the wire value was exactly 1.
    Bool(bool),
    /// String synthesized from one or more raw bytes.
    Text(String),
    /// Registry-resolved code; unknown codes keep their raw value.
    Symbol(Resolved),
    /// Opaque bytes, not further decoded.
    Bytes(Vec<u8>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Symbol(v) => write!(f, "{v}"),
            Value::Bytes(v) => f.write_str(&hex::encode(v)),
        }
    }
}

/// An ordered mapping from field name to decoded value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: BTreeMap<String, Value>,
}

impl FieldMap {
    /// Set a field, overwriting any previous value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.entries.insert(name.into(), value);
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Whether a field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge another map into this one; fields present in both keep the
    /// other map's value.
    pub fn merge(&mut self, other: FieldMap) {
        self.entries.extend(other.entries);
    }
}

/// A decoded payload: its id, the id's symbolic name, and whatever fields
/// the type's decoder produced (possibly none).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    /// The raw message-type id.
    pub id: u8,
    /// The id's name in the registry.
    pub name: Resolved,
    /// Decoded fields; empty for recognized-but-undecoded types.
    pub fields: FieldMap,
}

/// Sequential reader over a payload's data bytes.
///
/// Every read is bounds-checked; running off the end reports how many bytes
/// the current field would have needed.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        let byte = self
            .data
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::Truncated {
                expected: self.pos + 1,
                actual: self.data.len(),
            })?;
        self.pos += 1;
        Ok(byte)
    }

    fn u16_le(&mut self) -> Result<u16, DecodeError> {
        if self.pos + 2 > self.data.len() {
            return Err(DecodeError::Truncated {
                expected: self.pos + 2,
                actual: self.data.len(),
            });
        }
        let value = u16::from_le_bytes([self.data[self.pos], self.data[self.pos + 1]]);
        self.pos += 2;
        Ok(value)
    }

    /// Flag bytes are true iff the wire value is exactly 1.
    fn flag(&mut self) -> Result<bool, DecodeError> {
        Ok(self.u8()? == 1)
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.pos.min(self.data.len())..]
    }
}

/// Decode a payload body (id + data, without the checksum trailer).
///
/// An id missing from the registry is an error; a registered id without a
/// field decoder yields an empty field map.
pub fn decode(registry: &Registry, body: &[u8]) -> Result<DecodedMessage, DecodeError> {
    let Some((&id, data)) = body.split_first() else {
        return Err(DecodeError::Truncated {
            expected: 1,
            actual: 0,
        });
    };

    let name = registry.resolve_name(Namespace::MessageId, id as u16);
    if !name.is_known() {
        return Err(DecodeError::UnknownMessageType(id));
    }

    let fields = match id {
        MSG_ID_EXTENDED_STATUS_UPDATED => extended_status(registry, data)?,
        MSG_ID_VERSION_INFO => version_info(registry, data)?,
        MSG_ID_FOTA_DEVICE_INFO_SW_VERSION => fota_sw_version(data)?,
        _ => {
            log::debug!("no field decoder for {name}, passing through");
            FieldMap::default()
        }
    };

    Ok(DecodedMessage { id, name, fields })
}

// ============================================================================
// EXTENDED_STATUS_UPDATED
// ============================================================================

/// One step of a revision-gated decode: runs only when the payload's
/// revision byte is at least `min_revision`.
struct FieldRule {
    min_revision: u8,
    extract: fn(&mut Reader<'_>, &Registry, &mut FieldMap) -> Result<(), DecodeError>,
}

/// Field order is fixed on the wire; the revision byte decides how far down
/// this list the firmware wrote.
static EXTENDED_STATUS_RULES: &[FieldRule] = &[
    FieldRule { min_revision: 0, extract: ear_type },
    FieldRule { min_revision: 0, extract: batteries },
    FieldRule { min_revision: 0, extract: coupling },
    FieldRule { min_revision: 5, extract: placement },
    FieldRule { min_revision: 3, extract: battery_case },
    FieldRule { min_revision: 4, extract: ambient_sound },
    FieldRule { min_revision: 0, extract: equalizer },
    FieldRule { min_revision: 0, extract: touchpad },
    FieldRule { min_revision: 7, extract: double_tap_and_color },
    FieldRule { min_revision: 8, extract: side_tone },
    FieldRule { min_revision: 9, extract: extra_high_ambient },
];

fn extended_status(registry: &Registry, data: &[u8]) -> Result<FieldMap, DecodeError> {
    let mut reader = Reader::new(data);
    let mut fields = FieldMap::default();

    let revision = reader.u8()?;
    fields.set("revision", Value::U8(revision));

    for rule in EXTENDED_STATUS_RULES {
        if revision >= rule.min_revision {
            (rule.extract)(&mut reader, registry, &mut fields)?;
        }
    }

    Ok(fields)
}

fn ear_type(r: &mut Reader<'_>, _: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    fields.set("ear_type", Value::U8(r.u8()?));
    Ok(())
}

fn batteries(r: &mut Reader<'_>, _: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    fields.set("battery_left", Value::U8(r.u8()?));
    fields.set("battery_right", Value::U8(r.u8()?));
    Ok(())
}

fn coupling(r: &mut Reader<'_>, _: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    fields.set("coupled", Value::Bool(r.flag()?));
    fields.set("primary_earbud", Value::U8(r.u8()?));
    Ok(())
}

/// Placement packs both earbuds into one byte: left in the high nibble,
/// right in the low. Placement value 1 means the earbud is being worn.
fn placement(r: &mut Reader<'_>, _: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    let packed = r.u8()?;
    let left = packed >> 4;
    let right = packed & 0x0F;
    fields.set("placement_left", Value::U8(left));
    fields.set("placement_right", Value::U8(right));
    fields.set("wearing_left", Value::Bool(left == 1));
    fields.set("wearing_right", Value::Bool(right == 1));
    Ok(())
}

fn battery_case(r: &mut Reader<'_>, _: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    fields.set("battery_case", Value::U8(r.u8()?));
    Ok(())
}

fn ambient_sound(r: &mut Reader<'_>, _: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    fields.set("ambient_sound", Value::Bool(r.flag()?));
    fields.set("ambient_sound_volume", Value::U8(r.u8()?));
    fields.set("adjust_sound_sync", Value::Bool(r.flag()?));
    Ok(())
}

fn equalizer(r: &mut Reader<'_>, registry: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    let code = r.u8()?;
    fields.set(
        "equalizer_type",
        Value::Symbol(registry.resolve_name(Namespace::EqualizerMode, code as u16)),
    );
    Ok(())
}

fn touchpad(r: &mut Reader<'_>, registry: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    fields.set("touchpad_config", Value::Bool(r.flag()?));
    let packed = r.u8()?;
    fields.set(
        "touchpad_option_left",
        Value::Symbol(registry.resolve_name(Namespace::TouchpadOption, (packed >> 4) as u16)),
    );
    fields.set(
        "touchpad_option_right",
        Value::Symbol(registry.resolve_name(Namespace::TouchpadOption, (packed & 0x0F) as u16)),
    );
    Ok(())
}

/// The color is sent twice as consecutive little-endian u16 values; a
/// disagreement marks it invalid and the code collapses to 0.
fn double_tap_and_color(
    r: &mut Reader<'_>,
    registry: &Registry,
    fields: &mut FieldMap,
) -> Result<(), DecodeError> {
    fields.set("outside_double_tap", Value::Bool(r.flag()?));
    let first = r.u16_le()?;
    let second = r.u16_le()?;
    let code = if first == second { first } else { 0 };
    fields.set(
        "device_color",
        Value::Symbol(registry.resolve_name(Namespace::EarbudColor, code)),
    );
    Ok(())
}

fn side_tone(r: &mut Reader<'_>, _: &Registry, fields: &mut FieldMap) -> Result<(), DecodeError> {
    fields.set("side_tone", Value::Bool(r.flag()?));
    Ok(())
}

fn extra_high_ambient(
    r: &mut Reader<'_>,
    _: &Registry,
    fields: &mut FieldMap,
) -> Result<(), DecodeError> {
    fields.set("extra_high_ambient", Value::Bool(r.flag()?));
    Ok(())
}

// ============================================================================
// VERSION_INFO
// ============================================================================

fn version_info(registry: &Registry, data: &[u8]) -> Result<FieldMap, DecodeError> {
    let mut reader = Reader::new(data);
    let mut fields = FieldMap::default();

    let hw_left = reader.u8()?;
    let hw_right = reader.u8()?;
    fields.set("hardware_left", Value::Text(hardware_revision(hw_left)));
    fields.set("hardware_right", Value::Text(hardware_revision(hw_right)));

    fields.set(
        "software_left",
        Value::Text(software_version(registry, &mut reader)?),
    );
    fields.set(
        "software_right",
        Value::Text(software_version(registry, &mut reader)?),
    );

    fields.set("touch_firmware_left", Value::Text(format!("{:X}", reader.u8()?)));
    fields.set("touch_firmware_right", Value::Text(format!("{:X}", reader.u8()?)));

    Ok(fields)
}

fn hardware_revision(byte: u8) -> String {
    format!("rev{:X}.{:X}", byte >> 4, byte & 0x0F)
}

/// Software versions are not sent as strings. Each side sends three bytes:
/// a region selector, a packed year/month byte indexing the letter tables,
/// and a release indicator that is either a literal hex digit (< 16) or an
/// offset into the release-letter table.
fn software_version(registry: &Registry, reader: &mut Reader<'_>) -> Result<String, DecodeError> {
    let region = if reader.u8()? == 0 { "E" } else { "U" };
    let year_month = reader.u8()?;
    let year = registry.sw_year_letter(year_month >> 4);
    let month = registry.sw_month_letter(year_month & 0x0F);

    let release_byte = reader.u8()?;
    let release = if release_byte < 16 {
        format!("{release_byte:X}")
    } else {
        match registry.sw_release_letter((release_byte - 16) as usize) {
            Some(letter) => letter.to_string(),
            None => format!("{release_byte:X}"),
        }
    };

    Ok(format!("R175XX{region}0A{year}{month}{release}"))
}

// ============================================================================
// FOTA_DEVICE_INFO_SW_VERSION
// ============================================================================

/// The component identifier byte becomes part of the field key; the rest of
/// the payload stays opaque.
fn fota_sw_version(data: &[u8]) -> Result<FieldMap, DecodeError> {
    let mut reader = Reader::new(data);
    let component = reader.u8()?;

    let mut fields = FieldMap::default();
    fields.set(
        format!("{}{}", FOTA_SW_VERSION_PREFIX, component as char),
        Value::Bytes(reader.rest().to_vec()),
    );
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_FIELDS: &[&str] = &[
        "revision",
        "ear_type",
        "battery_left",
        "battery_right",
        "coupled",
        "primary_earbud",
        "equalizer_type",
        "touchpad_config",
        "touchpad_option_left",
        "touchpad_option_right",
    ];

    /// revision 2: base fields only.
    fn revision2_body() -> Vec<u8> {
        vec![
            MSG_ID_EXTENDED_STATUS_UPDATED,
            2,    // revision
            0,    // ear_type
            85,   // battery_left
            90,   // battery_right
            1,    // coupled
            0,    // primary_earbud
            3,    // equalizer: dynamic
            1,    // touchpad_config
            0x12, // touchpad options: voice-command / ambient-sound
        ]
    }

    /// revision 9: every documented field present.
    fn revision9_body() -> Vec<u8> {
        vec![
            MSG_ID_EXTENDED_STATUS_UPDATED,
            9,    // revision
            0,    // ear_type
            85,   // battery_left
            90,   // battery_right
            1,    // coupled
            0,    // primary_earbud
            0x12, // placement: left worn, right not
            77,   // battery_case
            1,    // ambient_sound
            2,    // ambient_sound_volume
            0,    // adjust_sound_sync
            3,    // equalizer: dynamic
            1,    // touchpad_config
            0x12, // touchpad options
            1,    // outside_double_tap
            0x05, 0x00, 0x05, 0x00, // color: pink, twice
            1,    // side_tone
            0,    // extra_high_ambient
        ]
    }

    #[test]
    fn test_revision_2_base_fields_only() {
        let registry = Registry::new();
        let message = decode(&registry, &revision2_body()).unwrap();

        assert_eq!(message.name, Resolved::Known("EXTENDED_STATUS_UPDATED"));
        for field in BASE_FIELDS {
            assert!(message.fields.contains(field), "missing {field}");
        }
        assert_eq!(message.fields.len(), BASE_FIELDS.len());
        assert!(!message.fields.contains("battery_case"));
        assert!(!message.fields.contains("ambient_sound"));
        assert!(!message.fields.contains("placement_left"));
        assert!(!message.fields.contains("device_color"));
    }

    #[test]
    fn test_revision_9_all_fields() {
        let registry = Registry::new();
        let message = decode(&registry, &revision9_body()).unwrap();
        let fields = &message.fields;

        assert_eq!(fields.len(), 22);
        assert_eq!(fields.get("revision"), Some(&Value::U8(9)));
        assert_eq!(fields.get("battery_left"), Some(&Value::U8(85)));
        assert_eq!(fields.get("battery_case"), Some(&Value::U8(77)));
        assert_eq!(fields.get("coupled"), Some(&Value::Bool(true)));
        assert_eq!(fields.get("ambient_sound_volume"), Some(&Value::U8(2)));
        assert_eq!(
            fields.get("equalizer_type"),
            Some(&Value::Symbol(Resolved::Known("dynamic")))
        );
        assert_eq!(
            fields.get("touchpad_option_left"),
            Some(&Value::Symbol(Resolved::Known("voice-command")))
        );
        assert_eq!(
            fields.get("touchpad_option_right"),
            Some(&Value::Symbol(Resolved::Known("ambient-sound")))
        );
        assert_eq!(
            fields.get("device_color"),
            Some(&Value::Symbol(Resolved::Known("pink")))
        );
        assert_eq!(fields.get("side_tone"), Some(&Value::Bool(true)));
        assert_eq!(fields.get("extra_high_ambient"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_wearing_derived_from_placement_nibbles() {
        let registry = Registry::new();
        let message = decode(&registry, &revision9_body()).unwrap();

        assert_eq!(message.fields.get("placement_left"), Some(&Value::U8(1)));
        assert_eq!(message.fields.get("placement_right"), Some(&Value::U8(2)));
        assert_eq!(message.fields.get("wearing_left"), Some(&Value::Bool(true)));
        assert_eq!(message.fields.get("wearing_right"), Some(&Value::Bool(false)));
    }

    #[test]
    fn test_color_disagreement_is_invalid() {
        let registry = Registry::new();
        let mut body = revision9_body();
        // Second color copy disagrees with the first.
        body[18] = 0x06;

        let message = decode(&registry, &body).unwrap();
        assert_eq!(
            message.fields.get("device_color"),
            Some(&Value::Symbol(Resolved::Unknown(0)))
        );
    }

    #[test]
    fn test_truncated_for_revision() {
        let registry = Registry::new();
        let mut body = revision9_body();
        body.truncate(10);

        let err = decode(&registry, &body).unwrap_err();
        assert!(matches!(err, DecodeError::Truncated { .. }));
    }

    #[test]
    fn test_unknown_message_type() {
        let registry = Registry::new();
        let err = decode(&registry, &[0x7E, 1, 2, 3]).unwrap_err();
        assert_eq!(err, DecodeError::UnknownMessageType(0x7E));
    }

    #[test]
    fn test_recognized_without_decoder() {
        let registry = Registry::new();
        let message = decode(&registry, &[MSG_ID_MANAGER_INFO, 0xAB, 0xCD]).unwrap();

        assert_eq!(message.name, Resolved::Known("MANAGER_INFO"));
        assert!(message.fields.is_empty());
    }

    #[test]
    fn test_empty_body() {
        let registry = Registry::new();
        assert!(matches!(
            decode(&registry, &[]).unwrap_err(),
            DecodeError::Truncated { expected: 1, actual: 0 }
        ));
    }

    #[test]
    fn test_version_info_synthesis() {
        let registry = Registry::new();
        let body = [
            MSG_ID_VERSION_INFO,
            0x12, // hardware left
            0x34, // hardware right
            0x00, 0x77, 0x06, // left: region E, year T month H, release 6
            0x01, 0x77, 0x19, // right: region U, year T month H, release letter J
            0x25, // touch firmware left
            0xA3, // touch firmware right
        ];

        let message = decode(&registry, &body).unwrap();
        let fields = &message.fields;
        assert_eq!(fields.get("hardware_left"), Some(&Value::Text("rev1.2".into())));
        assert_eq!(fields.get("hardware_right"), Some(&Value::Text("rev3.4".into())));
        assert_eq!(
            fields.get("software_left"),
            Some(&Value::Text("R175XXE0ATH6".into()))
        );
        assert_eq!(
            fields.get("software_right"),
            Some(&Value::Text("R175XXU0ATHJ".into()))
        );
        assert_eq!(fields.get("touch_firmware_left"), Some(&Value::Text("25".into())));
        assert_eq!(fields.get("touch_firmware_right"), Some(&Value::Text("A3".into())));
    }

    #[test]
    fn test_version_release_past_table_falls_back_to_hex() {
        let registry = Registry::new();
        // Release 0x40 is past the letter table; it renders as raw hex.
        let body = [
            MSG_ID_VERSION_INFO,
            0x00, 0x00,
            0x00, 0x00, 0x40,
            0x00, 0x00, 0x00,
            0x00, 0x00,
        ];

        let message = decode(&registry, &body).unwrap();
        assert_eq!(
            message.fields.get("software_left"),
            Some(&Value::Text("R175XXE0AMA40".into()))
        );
    }

    #[test]
    fn test_fota_sw_version_key_and_blob() {
        let registry = Registry::new();
        let body = [MSG_ID_FOTA_DEVICE_INFO_SW_VERSION, b'1', 0xDE, 0xAD];

        let message = decode(&registry, &body).unwrap();
        assert_eq!(
            message.fields.get("fota_sw_version_1"),
            Some(&Value::Bytes(vec![0xDE, 0xAD]))
        );
    }

    #[test]
    fn test_field_map_merge_overwrites() {
        let mut first = FieldMap::default();
        first.set("battery_left", Value::U8(10));
        first.set("coupled", Value::Bool(false));

        let mut second = FieldMap::default();
        second.set("battery_left", Value::U8(90));

        first.merge(second);
        assert_eq!(first.get("battery_left"), Some(&Value::U8(90)));
        assert_eq!(first.get("coupled"), Some(&Value::Bool(false)));
    }
}
