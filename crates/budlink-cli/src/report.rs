//! Report rendering for the accumulated device status.

use std::fmt::Write as _;

use budlink_protocol::{DeviceStatus, Resolved, SessionStats, Value};

/// Print a status report to stdout, as aligned text or JSON.
pub fn print(status: &DeviceStatus, stats: SessionStats, json: bool) {
    if json {
        println!("{}", render_json(status));
    } else if status.is_empty() {
        println!("no status received");
    } else {
        print!("{}", render_text(status));
    }

    tracing::debug!(
        accepted = stats.frames_accepted,
        rejected = stats.frames_rejected,
        undecoded = stats.messages_undecoded,
        "decode statistics"
    );
}

/// Render the status as one aligned `name  value` line per field.
pub fn render_text(status: &DeviceStatus) -> String {
    let width = status.iter().map(|(name, _)| name.len()).max().unwrap_or(0);

    let mut out = String::new();
    for (name, value) in status.iter() {
        let _ = writeln!(out, "{name:<width$}  {value}");
    }
    out
}

/// Render the status as a JSON object.
///
/// Booleans and integers keep their type; synthesized strings and known
/// symbols become strings; unknown symbols fall back to their raw code.
pub fn render_json(status: &DeviceStatus) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    for (name, value) in status.iter() {
        let json = match value {
            Value::U8(v) => serde_json::Value::from(*v),
            Value::U16(v) => serde_json::Value::from(*v),
            Value::Bool(v) => serde_json::Value::from(*v),
            Value::Text(v) => serde_json::Value::from(v.as_str()),
            Value::Symbol(Resolved::Known(n)) => serde_json::Value::from(*n),
            Value::Symbol(Resolved::Unknown(code)) => serde_json::Value::from(*code),
            Value::Bytes(b) => serde_json::Value::from(hex::encode(b)),
        };
        map.insert(name.to_string(), json);
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use budlink_protocol::{DecodedMessage, FieldMap};

    fn sample_status() -> DeviceStatus {
        let mut fields = FieldMap::default();
        fields.set("battery_left", Value::U8(80));
        fields.set("coupled", Value::Bool(true));
        fields.set("equalizer_type", Value::Symbol(Resolved::Known("dynamic")));
        fields.set("device_color", Value::Symbol(Resolved::Unknown(9)));
        fields.set("software_left", Value::Text("R175XXE0ATH6".into()));

        let mut status = DeviceStatus::default();
        status.apply(DecodedMessage {
            id: 0x61,
            name: Resolved::Known("EXTENDED_STATUS_UPDATED"),
            fields,
        });
        status
    }

    #[test]
    fn test_render_text_aligned() {
        let text = render_text(&sample_status());
        assert!(text.contains("battery_left    80"));
        assert!(text.contains("equalizer_type  dynamic"));
        assert!(text.contains("device_color    unknown (0x09)"));
    }

    #[test]
    fn test_render_json_types() {
        let json = render_json(&sample_status());
        assert_eq!(json["battery_left"], 80);
        assert_eq!(json["coupled"], true);
        assert_eq!(json["equalizer_type"], "dynamic");
        assert_eq!(json["device_color"], 9);
        assert_eq!(json["software_left"], "R175XXE0ATH6");
    }
}
