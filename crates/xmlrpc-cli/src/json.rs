//! JSON ↔ XML-RPC value bridge for the CLI.
//!
//! JSON cannot express every XML-RPC type, so the mapping is lossy at the
//! edges: decoded `dateTime.iso8601` values render as ISO-8601 strings and
//! `base64` values render as base64 strings. On the way in, integers within
//! the 32-bit range become `<int>` and every other number becomes
//! `<double>` (the serializer still collapses integral doubles to `<int>`
//! on the wire).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{Map, Number};
use xmlrpc_codec::Value;

pub fn json_to_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Nil,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => number_to_value(n),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(items) => Value::Array(items.iter().map(json_to_value).collect()),
        serde_json::Value::Object(map) => Value::Struct(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_value(v)))
                .collect(),
        ),
    }
}

fn number_to_value(n: &Number) -> Value {
    if let Some(i) = n.as_i64() {
        if let Ok(small) = i32::try_from(i) {
            return Value::Int(small);
        }
        return Value::Double(i as f64);
    }
    Value::Double(n.as_f64().unwrap_or(f64::NAN))
}

pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Nil => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Int(i) => serde_json::Value::Number((*i).into()),
        Value::Double(d) => Number::from_f64(*d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
        Value::Base64(bytes) => serde_json::Value::String(STANDARD.encode(bytes)),
        Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(value_to_json).collect())
        }
        Value::Struct(members) => serde_json::Value::Object(
            members
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
        // Custom values are an encode-only extension; the decoder never
        // produces them.
        Value::Custom(_) => serde_json::Value::Null,
    }
}
