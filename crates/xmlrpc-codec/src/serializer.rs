//! XML-RPC serializer — walks a [`Value`] tree and emits method-call,
//! method-response, or fault documents.
//!
//! All three entry points are pure value→string functions producing a
//! complete document including the `<?xml?>` declaration; no I/O is
//! performed. The value walk is an **iterative tree walk over an explicit
//! frame stack**, not a recursive function: nesting depth of
//! application-supplied (or attacker-supplied) values never translates into
//! call-stack depth. Each frame holds the value it is emitting plus, for
//! compound values, a child index; a compound frame advances one child per
//! turn and writes its closing tags when exhausted.
//!
//! # Wire rules
//!
//! - `Bool` → `<boolean>1|0</boolean>`
//! - `String`: empty → `<string/>`; containing markup (`<` or `&`) but not
//!   the `]]>` terminator → CDATA; otherwise escaped text
//! - `Int` → `<int>`; `Double` with a zero fractional part (in `i32`
//!   range) also → `<int>`, otherwise `<double>`
//! - `Nil` → `<nil/>`, `DateTime` → `<dateTime.iso8601>` (default
//!   [`DateFormatter`] options), `Base64` → `<base64>` (standard alphabet,
//!   no line wrapping)
//! - `Custom` → delegated entirely to [`CustomType::serialize`]
//!
//! [`CustomType::serialize`]: crate::value::CustomType::serialize

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::date_formatter::DateFormatter;
use crate::error::Result;
use crate::value::{Fault, Value, XmlCursor};

/// Render the XML for an XML-RPC method call. `encoding`, when given, is
/// placed in the XML declaration; the document text itself is UTF-8.
pub fn serialize_method_call(
    method: &str,
    params: &[Value],
    encoding: Option<&str>,
) -> Result<String> {
    let mut xml = Writer::new(Vec::new());
    xml.write_event(Event::Decl(BytesDecl::new("1.0", encoding, None)))?;
    xml.write_event(Event::Start(BytesStart::new("methodCall")))?;
    text_element(&mut xml, "methodName", method)?;
    xml.write_event(Event::Start(BytesStart::new("params")))?;
    for param in params {
        xml.write_event(Event::Start(BytesStart::new("param")))?;
        write_value(&mut xml, param)?;
        xml.write_event(Event::End(BytesEnd::new("param")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("params")))?;
    xml.write_event(Event::End(BytesEnd::new("methodCall")))?;
    into_string(xml)
}

/// Render the XML for a successful method response carrying exactly one
/// value.
pub fn serialize_method_response(value: &Value) -> Result<String> {
    let mut xml = Writer::new(Vec::new());
    xml.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    xml.write_event(Event::Start(BytesStart::new("methodResponse")))?;
    xml.write_event(Event::Start(BytesStart::new("params")))?;
    xml.write_event(Event::Start(BytesStart::new("param")))?;
    write_value(&mut xml, value)?;
    xml.write_event(Event::End(BytesEnd::new("param")))?;
    xml.write_event(Event::End(BytesEnd::new("params")))?;
    xml.write_event(Event::End(BytesEnd::new("methodResponse")))?;
    into_string(xml)
}

/// Render the XML for a fault response.
pub fn serialize_fault(fault: &Fault) -> Result<String> {
    let mut xml = Writer::new(Vec::new());
    xml.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    xml.write_event(Event::Start(BytesStart::new("methodResponse")))?;
    xml.write_event(Event::Start(BytesStart::new("fault")))?;
    write_value(&mut xml, &fault.to_value())?;
    xml.write_event(Event::End(BytesEnd::new("fault")))?;
    xml.write_event(Event::End(BytesEnd::new("methodResponse")))?;
    into_string(xml)
}

/// Per-value emission state. A frame with no state is "fresh": the next
/// turn classifies its value and either emits a leaf or opens a compound.
enum FrameState {
    Array { index: usize },
    Struct { index: usize, member_open: bool },
}

struct Frame<'a> {
    value: &'a Value,
    state: Option<FrameState>,
}

enum Turn<'a> {
    Push(&'a Value),
    Pop,
    Stay,
}

/// Emit `<value>…</value>` for one value tree using the explicit frame
/// stack.
fn write_value(xml: &mut XmlCursor, root: &Value) -> Result<()> {
    let mut stack = vec![Frame {
        value: root,
        state: None,
    }];

    while let Some(frame) = stack.last_mut() {
        let turn = advance(xml, frame)?;
        match turn {
            Turn::Push(child) => stack.push(Frame {
                value: child,
                state: None,
            }),
            Turn::Pop => {
                stack.pop();
            }
            Turn::Stay => {}
        }
    }
    Ok(())
}

fn advance<'a>(xml: &mut XmlCursor, frame: &mut Frame<'a>) -> Result<Turn<'a>> {
    match &mut frame.state {
        None => {
            xml.write_event(Event::Start(BytesStart::new("value")))?;
            match frame.value {
                Value::Array(_) => {
                    xml.write_event(Event::Start(BytesStart::new("array")))?;
                    xml.write_event(Event::Start(BytesStart::new("data")))?;
                    frame.state = Some(FrameState::Array { index: 0 });
                    Ok(Turn::Stay)
                }
                Value::Struct(_) => {
                    xml.write_event(Event::Start(BytesStart::new("struct")))?;
                    frame.state = Some(FrameState::Struct {
                        index: 0,
                        member_open: false,
                    });
                    Ok(Turn::Stay)
                }
                leaf => {
                    write_leaf(xml, leaf)?;
                    xml.write_event(Event::End(BytesEnd::new("value")))?;
                    Ok(Turn::Pop)
                }
            }
        }
        Some(FrameState::Array { index }) => {
            let Value::Array(items) = frame.value else {
                unreachable!("array frame state on non-array value");
            };
            if let Some(child) = items.get(*index) {
                *index += 1;
                Ok(Turn::Push(child))
            } else {
                xml.write_event(Event::End(BytesEnd::new("data")))?;
                xml.write_event(Event::End(BytesEnd::new("array")))?;
                xml.write_event(Event::End(BytesEnd::new("value")))?;
                Ok(Turn::Pop)
            }
        }
        Some(FrameState::Struct { index, member_open }) => {
            let Value::Struct(members) = frame.value else {
                unreachable!("struct frame state on non-struct value");
            };
            if *member_open {
                xml.write_event(Event::End(BytesEnd::new("member")))?;
                *member_open = false;
            }
            if let Some((key, child)) = members.get(*index) {
                *index += 1;
                xml.write_event(Event::Start(BytesStart::new("member")))?;
                text_element(xml, "name", key)?;
                *member_open = true;
                Ok(Turn::Push(child))
            } else {
                xml.write_event(Event::End(BytesEnd::new("struct")))?;
                xml.write_event(Event::End(BytesEnd::new("value")))?;
                Ok(Turn::Pop)
            }
        }
    }
}

fn write_leaf(xml: &mut XmlCursor, value: &Value) -> Result<()> {
    match value {
        Value::Nil => xml
            .write_event(Event::Empty(BytesStart::new("nil")))
            .map_err(From::from),
        Value::Bool(b) => text_element(xml, "boolean", if *b { "1" } else { "0" }),
        Value::Int(i) => text_element(xml, "int", &i.to_string()),
        Value::Double(d) => write_number(xml, *d),
        Value::String(s) => write_string(xml, s),
        Value::DateTime(dt) => text_element(
            xml,
            "dateTime.iso8601",
            &DateFormatter::default().encode_iso8601(dt),
        ),
        Value::Base64(bytes) => text_element(xml, "base64", &STANDARD.encode(bytes)),
        Value::Custom(custom) => custom.serialize(xml),
        Value::Array(_) | Value::Struct(_) => {
            unreachable!("compound values are handled by frame states")
        }
    }
}

/// One numeric type, two wire tags: integral doubles in the 32-bit range
/// collapse into `<int>` at encode time.
fn write_number(xml: &mut XmlCursor, d: f64) -> Result<()> {
    if d.fract() == 0.0 && d >= i32::MIN as f64 && d <= i32::MAX as f64 {
        text_element(xml, "int", &(d as i32).to_string())
    } else {
        text_element(xml, "double", &format!("{d}"))
    }
}

fn write_string(xml: &mut XmlCursor, s: &str) -> Result<()> {
    if s.is_empty() {
        xml.write_event(Event::Empty(BytesStart::new("string")))?;
        return Ok(());
    }
    xml.write_event(Event::Start(BytesStart::new("string")))?;
    if (s.contains('<') || s.contains('&')) && !s.contains("]]>") {
        xml.write_event(Event::CData(BytesCData::new(s)))?;
    } else {
        xml.write_event(Event::Text(BytesText::new(s)))?;
    }
    xml.write_event(Event::End(BytesEnd::new("string")))?;
    Ok(())
}

fn text_element(xml: &mut XmlCursor, tag: &str, text: &str) -> Result<()> {
    xml.write_event(Event::Start(BytesStart::new(tag)))?;
    xml.write_event(Event::Text(BytesText::new(text)))?;
    xml.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn into_string(xml: Writer<Vec<u8>>) -> Result<String> {
    // Every event is written from &str, so the buffer is valid UTF-8.
    Ok(String::from_utf8_lossy(&xml.into_inner()).into_owned())
}
