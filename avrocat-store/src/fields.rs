//! Dotted-path field resolution and textual coercion
//!
//! Equality selection and extraction both address record fields by dotted
//! paths (`sub.level2`) and compare or emit the resolved values in a
//! canonical textual form. Union values are transparent throughout: the
//! path descent and every coercion look through them.

use apache_avro::types::Value;

use crate::error::{Result, StoreError};
use crate::json;

/// Look through union wrappers to the carried value.
pub fn unwrap_union(value: &Value) -> &Value {
    match value {
        Value::Union(_, inner) => unwrap_union(inner),
        other => other,
    }
}

/// Whether the value is the designated absent/None value.
pub fn is_null(value: &Value) -> bool {
    matches!(unwrap_union(value), Value::Null)
}

/// Whether the record content carries no data at all.
///
/// Extraction skips such records instead of writing empty outputs.
pub fn is_empty_content(content: &Value) -> bool {
    match unwrap_union(content) {
        Value::Null => true,
        Value::Record(record_fields) => record_fields.is_empty(),
        Value::Map(entries) => entries.is_empty(),
        _ => false,
    }
}

/// Resolve a dotted field path inside the record content.
///
/// Each segment descends one level through nested records (or maps). A
/// missing segment fails with [`StoreError::FieldNotFound`] naming the full
/// dotted path.
pub fn resolve<'a>(content: &'a Value, dotted: &str) -> Result<&'a Value> {
    let mut current = content;
    for part in dotted.split('.') {
        let step = match unwrap_union(current) {
            Value::Record(record_fields) => record_fields
                .iter()
                .find(|(name, _)| name == part)
                .map(|(_, value)| value),
            Value::Map(entries) => entries.get(part),
            _ => None,
        };
        current = step.ok_or_else(|| StoreError::FieldNotFound {
            path: dotted.to_string(),
        })?;
    }
    Ok(current)
}

/// Canonical textual form of a value.
///
/// Used for equality comparison and for naming extracted outputs: null is
/// `null`, booleans are `true`/`false`, numbers print in decimal, strings
/// and enum symbols are verbatim, byte payloads decode lossily as UTF-8,
/// and containers fall back to their compact JSON form.
pub fn text_form(value: &Value) -> Result<String> {
    let value = unwrap_union(value);
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Int(n) | Value::Date(n) | Value::TimeMillis(n) => n.to_string(),
        Value::Long(n)
        | Value::TimeMicros(n)
        | Value::TimestampMillis(n)
        | Value::TimestampMicros(n)
        | Value::TimestampNanos(n)
        | Value::LocalTimestampMillis(n)
        | Value::LocalTimestampMicros(n)
        | Value::LocalTimestampNanos(n) => n.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(d) => d.to_string(),
        Value::String(s) | Value::Enum(_, s) => s.clone(),
        Value::Bytes(b) | Value::Fixed(_, b) => String::from_utf8_lossy(b).into_owned(),
        Value::Uuid(u) => u.to_string(),
        Value::Record(_) | Value::Array(_) | Value::Map(_) => json::encode(value, false)?,
        other => {
            return Err(StoreError::Unsupported(format!("{other:?}")));
        }
    })
}

/// Raw byte form of a value, for extraction to files.
///
/// Byte payloads pass through untouched; everything else is the canonical
/// text form encoded as UTF-8.
pub fn raw_form(value: &Value) -> Result<Vec<u8>> {
    match unwrap_union(value) {
        Value::Bytes(b) | Value::Fixed(_, b) => Ok(b.clone()),
        Value::String(s) => Ok(s.clone().into_bytes()),
        other => Ok(text_form(other)?.into_bytes()),
    }
}
