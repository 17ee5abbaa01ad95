//! Serialize → deserialize round trips for every supported value kind.

use chrono::{Local, TimeZone};
use xmlrpc_codec::{
    serialize_method_call, serialize_method_response, Deserializer, Value,
};

/// Assert that a value survives a method-response round trip unchanged.
fn assert_roundtrip(value: Value) {
    let xml = serialize_method_response(&value).expect("serialize failed");
    let decoded = Deserializer::new()
        .deserialize_method_response(xml.as_bytes())
        .expect("deserialize failed");
    assert_eq!(decoded, value, "round trip failed via:\n{xml}");
}

#[test]
fn roundtrip_nil() {
    assert_roundtrip(Value::Nil);
}

#[test]
fn roundtrip_booleans() {
    assert_roundtrip(Value::Bool(true));
    assert_roundtrip(Value::Bool(false));
}

#[test]
fn roundtrip_ints() {
    assert_roundtrip(Value::Int(0));
    assert_roundtrip(Value::Int(17));
    assert_roundtrip(Value::Int(-32));
    assert_roundtrip(Value::Int(i32::MAX));
    assert_roundtrip(Value::Int(i32::MIN));
}

#[test]
fn roundtrip_doubles() {
    assert_roundtrip(Value::Double(17.5));
    assert_roundtrip(Value::Double(-32.7777));
    assert_roundtrip(Value::Double(1.0e-7));
}

#[test]
fn integral_double_roundtrips_through_int() {
    // 4.0 encodes as <int>4</int>, so it comes back as the integer 4.
    let xml = serialize_method_response(&Value::Double(4.0)).unwrap();
    let decoded = Deserializer::new()
        .deserialize_method_response(xml.as_bytes())
        .unwrap();
    assert_eq!(decoded, Value::Int(4));
}

#[test]
fn roundtrip_strings() {
    assert_roundtrip(Value::String("testString".into()));
    assert_roundtrip(Value::String(String::new()));
    assert_roundtrip(Value::String("a & b <tag> \"quoted\"".into()));
    assert_roundtrip(Value::String("<html>\n<body>Congrats</body>\n</html>".into()));
    assert_roundtrip(Value::String("contains ]]> terminator".into()));
    assert_roundtrip(Value::String("caf\u{e9} \u{4f60}\u{597d} \u{1f601}".into()));
}

#[test]
fn roundtrip_datetime_to_the_second() {
    let dt = Local
        .with_ymd_and_hms(2012, 6, 7, 11, 35, 10)
        .unwrap()
        .fixed_offset();
    assert_roundtrip(Value::DateTime(dt));
}

#[test]
fn roundtrip_base64() {
    assert_roundtrip(Value::Base64(b"testing".to_vec()));
    assert_roundtrip(Value::Base64(vec![]));
    assert_roundtrip(Value::Base64((0u8..=255).collect()));
}

#[test]
fn roundtrip_arrays() {
    assert_roundtrip(Value::Array(vec![]));
    assert_roundtrip(Value::Array(vec![
        Value::Int(178),
        Value::String("testString".into()),
        Value::Bool(false),
        Value::Nil,
    ]));
    assert_roundtrip(Value::Array(vec![Value::Array(vec![Value::Array(vec![
        Value::Int(1),
    ])])]));
}

#[test]
fn roundtrip_structs() {
    assert_roundtrip(Value::Struct(vec![]));
    assert_roundtrip(Value::structure([
        ("stringName", Value::String("string1".into())),
        ("objectName", Value::structure([("intName", Value::Int(4))])),
    ]));
    assert_roundtrip(Value::structure([("", Value::String("empty key".into()))]));
}

#[test]
fn roundtrip_struct_of_arrays_of_structs() {
    assert_roundtrip(Value::structure([(
        "rows",
        Value::Array(vec![
            Value::structure([("id", Value::Int(1)), ("ok", Value::Bool(true))]),
            Value::structure([("id", Value::Int(2)), ("ok", Value::Bool(false))]),
        ]),
    )]));
}

#[test]
fn roundtrip_method_call_with_params() {
    let params = vec![
        Value::Int(2),
        Value::String("x".into()),
        Value::Array(vec![Value::Double(1.5)]),
    ];
    let xml = serialize_method_call("multiply", &params, None).unwrap();
    let (method, decoded) = Deserializer::new()
        .deserialize_method_call(xml.as_bytes())
        .unwrap();
    assert_eq!(method, "multiply");
    assert_eq!(decoded, params);
}
