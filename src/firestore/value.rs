//! Firestore typed-value mapping.
//!
//! The REST API wraps every field in a type envelope
//! (`{"stringValue": "x"}`, `{"mapValue": {"fields": …}}`, …). Documents are
//! decoded to plain JSON before hitting the serde models, and plain JSON is
//! encoded back into envelopes when staging writes.

use serde_json::{Map, Value, json};

/// Decode a Firestore `fields` map into a plain JSON object.
pub(crate) fn decode_fields(fields: &Map<String, Value>) -> Value {
    Value::Object(
        fields
            .iter()
            .map(|(name, value)| (name.clone(), decode(value)))
            .collect(),
    )
}

/// Decode a single Firestore typed value.
pub(crate) fn decode(value: &Value) -> Value {
    let Some(object) = value.as_object() else {
        return Value::Null;
    };

    let Some((kind, inner)) = object.iter().next() else {
        return Value::Null;
    };

    match kind.as_str() {
        "nullValue" => Value::Null,
        "booleanValue" | "doubleValue" | "stringValue" | "timestampValue" | "referenceValue"
        | "bytesValue" => inner.clone(),
        // Integers arrive as decimal strings.
        "integerValue" => inner
            .as_str()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map_or(Value::Null, Value::from),
        "arrayValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode).collect())
                .unwrap_or_default(),
        ),
        "mapValue" => inner
            .get("fields")
            .and_then(Value::as_object)
            .map_or_else(|| json!({}), decode_fields),
        "geoPointValue" => inner.clone(),
        _ => Value::Null,
    }
}

/// Encode a plain JSON value into a Firestore typed value.
pub(crate) fn encode(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(values) => json!({
            "arrayValue": { "values": values.iter().map(encode).collect::<Vec<_>>() }
        }),
        Value::Object(fields) => json!({
            "mapValue": {
                "fields": fields
                    .iter()
                    .map(|(name, value)| (name.clone(), encode(value)))
                    .collect::<Map<String, Value>>()
            }
        }),
    }
}
