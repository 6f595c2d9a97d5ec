//! Binary-safe JSON projection of decoded records
//!
//! Decoded records may carry raw byte payloads; serializing those as JSON
//! strings would corrupt any non-UTF8 bytes. The conversion here walks the
//! typed value tree and emits byte payloads as base64 strings, so the output
//! is always a valid JSON document that round-trips the original bytes.
//! Record fields keep their schema declaration order.

use apache_avro::types::Value;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::error::{Result, StoreError};

/// Convert a decoded value into a JSON value.
///
/// Bytes and fixed payloads become base64 strings, unions unwrap to their
/// inner value, temporal logical types stay as their underlying numbers, and
/// map keys are emitted in sorted order for deterministic output. Value
/// kinds with no defined JSON projection (decimals, durations) fail with
/// [`StoreError::Unsupported`].
pub fn to_json_value(value: &Value) -> Result<serde_json::Value> {
    use serde_json::Value as Json;
    Ok(match value {
        Value::Null => Json::Null,
        Value::Boolean(b) => Json::from(*b),
        Value::Int(n) | Value::Date(n) | Value::TimeMillis(n) => Json::from(*n),
        Value::Long(n)
        | Value::TimeMicros(n)
        | Value::TimestampMillis(n)
        | Value::TimestampMicros(n)
        | Value::TimestampNanos(n)
        | Value::LocalTimestampMillis(n)
        | Value::LocalTimestampMicros(n)
        | Value::LocalTimestampNanos(n) => Json::from(*n),
        Value::Float(f) => Json::from(*f),
        Value::Double(d) => Json::from(*d),
        Value::Bytes(b) | Value::Fixed(_, b) => Json::from(STANDARD.encode(b)),
        Value::String(s) | Value::Enum(_, s) => Json::from(s.as_str()),
        Value::Uuid(u) => Json::from(u.to_string()),
        Value::Union(_, inner) => to_json_value(inner)?,
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(to_json_value(item)?);
            }
            Json::Array(out)
        }
        Value::Map(entries) => {
            let mut sorted: Vec<(&String, &Value)> = entries.iter().collect();
            sorted.sort_by_key(|(key, _)| key.as_str());
            let mut object = serde_json::Map::with_capacity(sorted.len());
            for (key, entry) in sorted {
                object.insert(key.clone(), to_json_value(entry)?);
            }
            Json::Object(object)
        }
        Value::Record(record_fields) => {
            let mut object = serde_json::Map::with_capacity(record_fields.len());
            for (name, field) in record_fields {
                object.insert(name.clone(), to_json_value(field)?);
            }
            Json::Object(object)
        }
        other => {
            return Err(StoreError::Unsupported(format!("{other:?}")));
        }
    })
}

/// Serialize a decoded value as JSON text.
///
/// Compact mode uses minimal separators; pretty mode indents with four
/// spaces.
pub fn encode(value: &Value, pretty: bool) -> Result<String> {
    let json = to_json_value(value)?;
    if pretty {
        pretty_json(&json)
    } else {
        Ok(serde_json::to_string(&json)?)
    }
}

/// Pretty-print a JSON value with a four-space indent.
pub fn pretty_json(value: &serde_json::Value) -> Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8(out).expect("serializer produced invalid UTF-8"))
}
