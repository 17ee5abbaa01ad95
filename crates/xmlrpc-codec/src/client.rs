//! Minimal request/response client over a generic transport.
//!
//! The codec consumes and produces only in-memory values and XML streams;
//! how those streams travel is the [`Transport`]'s business. An HTTP (or
//! test-fixture) transport implements one method: take a rendered request
//! body, return a readable response stream.

use std::io::BufRead;

use crate::deserializer::Deserializer;
use crate::error::Result;
use crate::serializer::serialize_method_call;
use crate::value::Value;

/// Boundary contract for the transport collaborator. Implementations carry
/// the request body to the peer and hand back the raw response stream;
/// headers, sockets, and connection lifecycle are entirely theirs.
pub trait Transport {
    type Stream: BufRead;

    fn request(&mut self, body: &str) -> Result<Self::Stream>;
}

/// XML-RPC client: serializes calls, sends them through the transport, and
/// decodes each response with a fresh single-use [`Deserializer`].
pub struct Client<T> {
    transport: T,
    encoding: Option<String>,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            encoding: None,
        }
    }

    /// Set the encoding name placed in the request's XML declaration.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    /// Invoke a remote method. A remote fault surfaces as
    /// [`crate::XmlRpcError::Fault`].
    pub fn call(&mut self, method: &str, params: &[Value]) -> Result<Value> {
        let body = serialize_method_call(method, params, self.encoding.as_deref())?;
        let response = self.transport.request(&body)?;
        Deserializer::new().deserialize_method_response(response)
    }
}
