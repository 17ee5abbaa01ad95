//! Client/server pairing tests over an in-memory transport.

use std::io::Cursor;

use xmlrpc_codec::{
    Client, Fault, Result, Server, Transport, Value, XmlRpcError, FAULT_METHOD_NOT_FOUND,
    FAULT_PARSE_ERROR,
};

/// Loopback transport: every request body is handed straight to a [`Server`]
/// and the rendered response document comes back as the stream.
struct Loopback {
    server: Server,
}

impl Transport for Loopback {
    type Stream = Cursor<Vec<u8>>;

    fn request(&mut self, body: &str) -> Result<Self::Stream> {
        let mut out = Vec::new();
        self.server.handle(body.as_bytes(), &mut out)?;
        Ok(Cursor::new(out))
    }
}

fn demo_server() -> Server {
    let mut server = Server::new();
    server.on("echo", |params| Ok(Value::Array(params)));
    server.on("pow", |params| {
        let base = params
            .first()
            .and_then(Value::as_i32)
            .ok_or_else(|| Fault::new(1, "pow expects two integers"))?;
        let exp = params
            .get(1)
            .and_then(Value::as_i32)
            .ok_or_else(|| Fault::new(1, "pow expects two integers"))?;
        Ok(Value::Int(base.pow(exp as u32)))
    });
    server
}

// ============================================================
// Successful calls
// ============================================================

#[test]
fn calls_a_registered_method() {
    let mut client = Client::new(Loopback {
        server: demo_server(),
    });
    let result = client
        .call("pow", &[Value::Int(2), Value::Int(10)])
        .unwrap();
    assert_eq!(result, Value::Int(1024));
}

#[test]
fn echoes_structured_params() {
    let mut client = Client::new(Loopback {
        server: demo_server(),
    });
    let params = vec![
        Value::String("hello".to_owned()),
        Value::structure([("n".to_owned(), Value::Int(7))]),
    ];
    let result = client.call("echo", &params).unwrap();
    assert_eq!(result, Value::Array(params));
}

#[test]
fn encoding_declaration_survives_the_loop() {
    let mut client = Client::new(Loopback {
        server: demo_server(),
    })
    .with_encoding("utf-8");
    let result = client.call("echo", &[Value::Bool(true)]).unwrap();
    assert_eq!(result, Value::Array(vec![Value::Bool(true)]));
}

// ============================================================
// Faults
// ============================================================

#[test]
fn handler_fault_surfaces_as_error() {
    let mut client = Client::new(Loopback {
        server: demo_server(),
    });
    let err = client
        .call("pow", &[Value::String("two".to_owned())])
        .unwrap_err();
    match err {
        XmlRpcError::Fault {
            fault_code,
            fault_string,
        } => {
            assert_eq!(fault_code, 1);
            assert_eq!(fault_string, "pow expects two integers");
        }
        other => panic!("expected fault, got {other:?}"),
    }
}

#[test]
fn unknown_method_faults_with_method_not_found() {
    let mut client = Client::new(Loopback {
        server: demo_server(),
    });
    let err = client.call("nope", &[]).unwrap_err();
    match err {
        XmlRpcError::Fault { fault_code, .. } => assert_eq!(fault_code, FAULT_METHOD_NOT_FOUND),
        other => panic!("expected fault, got {other:?}"),
    }
}

#[test]
fn undecodable_request_faults_with_parse_error() {
    let server = demo_server();
    let mut out = Vec::new();
    server.handle("this is not xml".as_bytes(), &mut out).unwrap();

    let err = xmlrpc_codec::Deserializer::new()
        .deserialize_method_response(out.as_slice())
        .unwrap_err();
    match err {
        XmlRpcError::Fault { fault_code, .. } => assert_eq!(fault_code, FAULT_PARSE_ERROR),
        other => panic!("expected fault, got {other:?}"),
    }
}

#[test]
fn method_response_sent_as_request_is_rejected() {
    // The request side only accepts methodCall documents.
    let server = demo_server();
    let mut out = Vec::new();
    server
        .handle(
            "<?xml version=\"1.0\"?><methodResponse><params></params></methodResponse>".as_bytes(),
            &mut out,
        )
        .unwrap();
    let err = xmlrpc_codec::Deserializer::new()
        .deserialize_method_response(out.as_slice())
        .unwrap_err();
    match err {
        XmlRpcError::Fault { fault_code, .. } => assert_eq!(fault_code, FAULT_PARSE_ERROR),
        other => panic!("expected fault, got {other:?}"),
    }
}
