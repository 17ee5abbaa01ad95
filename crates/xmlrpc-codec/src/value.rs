//! The XML-RPC value model.
//!
//! [`Value`] is the universal payload type exchanged across the codec
//! boundary: a tagged union over the XML-RPC built-in types plus the
//! [`CustomType`] extension point. Values are built by the caller before a
//! serialize call and are immutable from the codec's perspective; the
//! deserializer reconstructs them bottom-up on its value stack.
//!
//! Two wire quirks live in this model rather than in the codec:
//!
//! - XML-RPC has a single numeric type that collapses into two wire tags at
//!   encode time: a [`Value::Double`] whose fractional part is zero (and
//!   that fits in `i32`) is emitted as `<int>`, so `Double(4.0)` round-trips
//!   to `Int(4)`.
//! - `<i8>` values are validated as integer literals but carried as
//!   [`Value::String`], preserving precision beyond what a 32-bit integer
//!   (or an IEEE double) could hold.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use quick_xml::Writer;

use crate::error::Result;

/// The XML writer handed to [`CustomType::serialize`] as its cursor. The
/// open `<value>` element has already been written; the implementation owns
/// everything inside it.
pub type XmlCursor = Writer<Vec<u8>>;

/// Extension capability for values that serialize as user-defined tags,
/// bypassing the built-in type switch. The codec checks only for this
/// capability, never for a concrete type.
///
/// The decoder never produces [`Value::Custom`]; an unknown tag on the
/// decode side is a hard error. Custom tags are an encode-only extension.
pub trait CustomType: fmt::Debug + Send + Sync {
    /// The wire tag name this value serializes under.
    fn tag_name(&self) -> &str;

    /// Write the full markup for this value under the open `<value>`
    /// cursor, including the tag itself.
    fn serialize(&self, cursor: &mut XmlCursor) -> Result<()>;
}

/// Ready-made [`CustomType`]: a tag name wrapping raw text content.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomText {
    pub tag: String,
    pub raw: String,
}

impl CustomText {
    pub fn new(tag: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            raw: raw.into(),
        }
    }
}

impl CustomType for CustomText {
    fn tag_name(&self) -> &str {
        &self.tag
    }

    fn serialize(&self, cursor: &mut XmlCursor) -> Result<()> {
        use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
        cursor.write_event(Event::Start(BytesStart::new(self.tag.as_str())))?;
        cursor.write_event(Event::Text(BytesText::new(&self.raw)))?;
        cursor.write_event(Event::End(BytesEnd::new(self.tag.as_str())))?;
        Ok(())
    }
}

/// An XML-RPC value: the tagged union exchanged by serializer and
/// deserializer.
#[derive(Debug, Clone)]
pub enum Value {
    /// `<nil/>`
    Nil,
    /// `<boolean>`
    Bool(bool),
    /// `<int>` / `<i4>` (32-bit signed range)
    Int(i32),
    /// `<double>` (IEEE-754); integral in-range doubles encode as `<int>`
    Double(f64),
    /// `<string>`, untagged value text, and validated `<i8>` passthrough
    String(String),
    /// `<dateTime.iso8601>`
    DateTime(DateTime<FixedOffset>),
    /// `<base64>` raw bytes
    Base64(Vec<u8>),
    /// `<array><data>…` ordered sequence
    Array(Vec<Value>),
    /// `<struct>` members in insertion order; keys unique
    Struct(Vec<(String, Value)>),
    /// Extension value owning its own serialization
    Custom(Arc<dyn CustomType>),
}

impl Value {
    /// Build a struct value from key/value pairs, keeping insertion order.
    pub fn structure<K: Into<String>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Struct(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Wrap a [`CustomType`] implementation.
    pub fn custom(value: impl CustomType + 'static) -> Value {
        Value::Custom(Arc::new(value))
    }

    /// Look up a struct member by key. Returns `None` for non-structs.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Base64(a), Value::Base64(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => a == b,
            // Custom values carry opaque behavior; identity is the only
            // meaningful equality.
            (Value::Custom(a), Value::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

/// A structured remote error: the required `faultCode`/`faultString` pair of
/// a `<fault>` envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    pub fault_code: i32,
    pub fault_string: String,
}

impl Fault {
    pub fn new(fault_code: i32, fault_string: impl Into<String>) -> Self {
        Self {
            fault_code,
            fault_string: fault_string.into(),
        }
    }

    /// The struct value this fault serializes as.
    pub fn to_value(&self) -> Value {
        Value::structure([
            ("faultCode", Value::Int(self.fault_code)),
            ("faultString", Value::String(self.fault_string.clone())),
        ])
    }

    /// Extract a fault from a decoded `<fault>` struct. Missing members
    /// degrade to zero / empty rather than failing the decode.
    pub fn from_value(value: &Value) -> Fault {
        Fault {
            fault_code: value
                .get("faultCode")
                .and_then(Value::as_i32)
                .unwrap_or_default(),
            fault_string: value
                .get("faultString")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        }
    }
}
