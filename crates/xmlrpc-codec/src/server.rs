//! Minimal method-dispatch server over caller-provided streams.
//!
//! [`Server`] owns a registry of method handlers and turns one request
//! stream into one response document. Listening, accepting, and connection
//! teardown belong to the transport collaborator; this type only speaks the
//! wire codec.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::deserializer::Deserializer;
use crate::error::Result;
use crate::serializer::{serialize_fault, serialize_method_response};
use crate::value::{Fault, Value};

/// Fault code for a call to an unregistered method.
pub const FAULT_METHOD_NOT_FOUND: i32 = -32601;
/// Fault code for a request that failed to decode.
pub const FAULT_PARSE_ERROR: i32 = -32700;

type Handler = Box<dyn Fn(Vec<Value>) -> std::result::Result<Value, Fault> + Send + Sync>;

/// XML-RPC request handler: decode a call, dispatch, encode the response.
#[derive(Default)]
pub struct Server {
    handlers: HashMap<String, Handler>,
}

impl Server {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a method name. A handler returns either the
    /// response value or a [`Fault`] to report to the caller.
    pub fn on<F>(&mut self, method: impl Into<String>, handler: F)
    where
        F: Fn(Vec<Value>) -> std::result::Result<Value, Fault> + Send + Sync + 'static,
    {
        self.handlers.insert(method.into(), Box::new(handler));
    }

    /// Decode one method call from `request` and write the full response
    /// document to `response`. Undecodable requests and unknown methods
    /// are answered with fault documents, not transport errors.
    pub fn handle(&self, request: impl BufRead, response: &mut impl Write) -> Result<()> {
        let body = match Deserializer::new().deserialize_method_call(request) {
            Ok((method, params)) => match self.handlers.get(&method) {
                Some(handler) => match handler(params) {
                    Ok(value) => serialize_method_response(&value)?,
                    Err(fault) => serialize_fault(&fault)?,
                },
                None => serialize_fault(&Fault::new(FAULT_METHOD_NOT_FOUND, "Method not found"))?,
            },
            Err(_) => serialize_fault(&Fault::new(FAULT_PARSE_ERROR, "Parse error"))?,
        };
        response.write_all(body.as_bytes())?;
        Ok(())
    }
}
