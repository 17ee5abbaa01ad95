//! XML-RPC streaming deserializer.
//!
//! A [`Deserializer`] is a short-lived state machine created per in-flight
//! message and consumed by the deserialize call — single use is enforced by
//! taking `self`. It drives an event loop over a [`quick_xml::Reader`]
//! (open/close/text/CDATA events in strict document order), so a message
//! may arrive over the wire in arbitrary chunk boundaries: any `BufRead`
//! works, and parsing never requires the whole document in memory.
//!
//! # The mark-stack fold
//!
//! Decoded values accumulate on a flat value stack in document order. A
//! parallel marks stack records, for each open `<array>`/`<struct>`, the
//! stack depth at which its children begin. Closing the compound pops the
//! mark, slices everything above that depth off the value stack, folds the
//! slice into one array (or one struct, consuming `(name, value)` pairs two
//! at a time — which is why `<name>` pushes its text as a plain stack
//! value), and pushes the folded result back. The stacks are index-based on
//! purpose: nesting depth never becomes recursion depth.
//!
//! # Errors
//!
//! The first error — lexical (tokenizer), structural (unknown tag, wrong
//! envelope, unresolved marks), or value-format (illegal literals) — aborts
//! the decode and is surfaced exactly once through the returned `Result`. A
//! well-formed `<fault>` envelope surfaces as [`XmlRpcError::Fault`]
//! carrying `faultCode`/`faultString`.

use std::io::BufRead;
use std::mem;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::date_formatter::DateFormatter;
use crate::error::{Result, XmlRpcError};
use crate::value::{Fault, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Envelope {
    MethodCall,
    MethodResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseKind {
    Params,
    Fault,
}

/// Single-use decoder for one XML-RPC message.
#[derive(Debug, Default)]
pub struct Deserializer {
    stack: Vec<Value>,
    marks: Vec<usize>,
    data: String,
    /// Set on `<value>` open, cleared by every typed close; still set when
    /// `</value>` arrives means the value used the untagged text shorthand.
    value_text: bool,
    envelope: Option<Envelope>,
    response_kind: Option<ResponseKind>,
    method_name: Option<String>,
    formatter: DateFormatter,
}

/// Everything `run` extracts from a fully parsed document.
struct Decoded {
    envelope: Envelope,
    response_kind: Option<ResponseKind>,
    method_name: Option<String>,
    values: Vec<Value>,
}

impl Deserializer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a `<methodCall>` document into its method name and ordered
    /// parameter values.
    pub fn deserialize_method_call(self, stream: impl BufRead) -> Result<(String, Vec<Value>)> {
        let decoded = self.run(stream)?;
        if decoded.envelope != Envelope::MethodCall {
            return Err(XmlRpcError::NotMethodCall);
        }
        match decoded.method_name {
            Some(method) if !method.is_empty() => Ok((method, decoded.values)),
            _ => Err(XmlRpcError::MissingMethodName),
        }
    }

    /// Decode a `<methodResponse>` document into its single value. A fault
    /// response surfaces as [`XmlRpcError::Fault`].
    pub fn deserialize_method_response(self, stream: impl BufRead) -> Result<Value> {
        let decoded = self.run(stream)?;
        if decoded.values.len() > 1 {
            return Err(XmlRpcError::MoreThanOneParam);
        }
        if decoded.envelope != Envelope::MethodResponse {
            return Err(XmlRpcError::NotMethodResponse);
        }
        if decoded.response_kind.is_none() {
            return Err(XmlRpcError::InvalidMethodResponse);
        }
        decoded
            .values
            .into_iter()
            .next()
            .ok_or(XmlRpcError::InvalidMethodResponse)
    }

    fn run(mut self, stream: impl BufRead) -> Result<Decoded> {
        let mut xml = Reader::from_reader(stream);
        let mut buf = Vec::new();
        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) => self.on_open(&e.name().as_ref().to_ascii_uppercase()),
                Event::Empty(e) => {
                    let name = e.name().as_ref().to_ascii_uppercase();
                    self.on_open(&name);
                    self.on_close(&name)?;
                }
                Event::End(e) => self.on_close(&e.name().as_ref().to_ascii_uppercase())?,
                Event::Text(e) => self.data.push_str(&e.unescape()?),
                Event::CData(e) => {
                    let text = xml.decoder().decode(e.as_ref())?;
                    self.data.push_str(&text);
                }
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
            buf.clear();
        }

        let envelope = match self.envelope {
            // Never saw a complete envelope, or an array/struct mark was
            // left unresolved: malformed nesting.
            Some(envelope) if self.marks.is_empty() => envelope,
            _ => return Err(XmlRpcError::InvalidMessage),
        };

        if self.response_kind == Some(ResponseKind::Fault) {
            let fault = self
                .stack
                .first()
                .map(Fault::from_value)
                .ok_or(XmlRpcError::InvalidMessage)?;
            return Err(XmlRpcError::Fault {
                fault_code: fault.fault_code,
                fault_string: fault.fault_string,
            });
        }

        Ok(Decoded {
            envelope,
            response_kind: self.response_kind,
            method_name: self.method_name,
            values: self.stack,
        })
    }

    fn on_open(&mut self, name: &[u8]) {
        if name == b"ARRAY" || name == b"STRUCT" {
            self.marks.push(self.stack.len());
        }
        self.data.clear();
        self.value_text = name == b"VALUE";
    }

    fn on_close(&mut self, name: &[u8]) -> Result<()> {
        let data = mem::take(&mut self.data);
        match name {
            b"BOOLEAN" => self.end_boolean(data)?,
            b"INT" | b"I4" => self.end_int(data)?,
            b"I8" => self.end_i8(data)?,
            b"DOUBLE" => self.end_double(data)?,
            b"STRING" | b"NAME" => self.end_string(data),
            b"ARRAY" => self.end_array()?,
            b"STRUCT" => self.end_struct()?,
            b"BASE64" => self.end_base64(data)?,
            b"DATETIME.ISO8601" => self.end_datetime(data)?,
            b"NIL" => self.end_nil(),
            b"VALUE" => self.end_value(data),
            b"PARAMS" => self.response_kind = Some(ResponseKind::Params),
            b"FAULT" => self.response_kind = Some(ResponseKind::Fault),
            b"METHODRESPONSE" => self.envelope = Some(Envelope::MethodResponse),
            b"METHODCALL" => self.envelope = Some(Envelope::MethodCall),
            b"METHODNAME" => self.method_name = Some(data),
            // Structural tags with no independent value.
            b"DATA" | b"PARAM" | b"MEMBER" => {}
            other => {
                return Err(XmlRpcError::UnknownTag(
                    String::from_utf8_lossy(other).into_owned(),
                ))
            }
        }
        Ok(())
    }

    fn push(&mut self, value: Value) {
        self.stack.push(value);
        self.value_text = false;
    }

    fn end_nil(&mut self) {
        // Enclosed text, if any, is disregarded.
        self.push(Value::Nil);
    }

    fn end_boolean(&mut self, data: String) -> Result<()> {
        match data.as_str() {
            "1" => self.push(Value::Bool(true)),
            "0" => self.push(Value::Bool(false)),
            _ => return Err(XmlRpcError::IllegalBoolean(data)),
        }
        Ok(())
    }

    fn end_int(&mut self, data: String) -> Result<()> {
        match data.trim().parse::<i32>() {
            Ok(value) => {
                self.push(Value::Int(value));
                Ok(())
            }
            Err(_) => Err(XmlRpcError::ExpectedInteger(data)),
        }
    }

    /// `<i8>` is validated as an integer literal but carried as a string;
    /// a native 32-bit (or IEEE double) slot would lose precision.
    fn end_i8(&mut self, data: String) -> Result<()> {
        if is_integer_literal(data.trim()) {
            self.end_string(data.trim().to_owned());
            Ok(())
        } else {
            Err(XmlRpcError::ExpectedI8(data))
        }
    }

    fn end_double(&mut self, data: String) -> Result<()> {
        match data.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => {
                self.push(Value::Double(value));
                Ok(())
            }
            _ => Err(XmlRpcError::ExpectedDouble(data)),
        }
    }

    fn end_string(&mut self, data: String) {
        self.push(Value::String(data));
    }

    fn end_array(&mut self) -> Result<()> {
        let mark = self.marks.pop().ok_or(XmlRpcError::InvalidMessage)?;
        let items = self.stack.split_off(mark);
        self.push(Value::Array(items));
        Ok(())
    }

    fn end_struct(&mut self) -> Result<()> {
        let mark = self.marks.pop().ok_or(XmlRpcError::InvalidMessage)?;
        let items = self.stack.split_off(mark);
        let mut members: Vec<(String, Value)> = Vec::with_capacity(items.len() / 2);
        let mut iter = items.into_iter();
        while let (Some(name), Some(value)) = (iter.next(), iter.next()) {
            let Value::String(key) = name else {
                return Err(XmlRpcError::InvalidMessage);
            };
            // Keys are unique; a duplicate overwrites the earlier member.
            match members.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => members.push((key, value)),
            }
        }
        self.push(Value::Struct(members));
        Ok(())
    }

    fn end_base64(&mut self, data: String) -> Result<()> {
        // Wire base64 is frequently line-wrapped; strip whitespace before
        // the strict standard-alphabet decode.
        let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD.decode(compact)?;
        self.push(Value::Base64(bytes));
        Ok(())
    }

    fn end_datetime(&mut self, data: String) -> Result<()> {
        let instant = self.formatter.decode_iso8601(&data)?;
        self.push(Value::DateTime(instant));
        Ok(())
    }

    /// `</value>` with no typed child: the accumulated text is the value
    /// (the untagged string shorthand). An empty `<value></value>` thus
    /// decodes as the empty string.
    fn end_value(&mut self, data: String) {
        if self.value_text {
            self.end_string(data);
        }
    }
}

fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}
