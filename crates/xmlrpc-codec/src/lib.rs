//! # xmlrpc-codec
//!
//! Pure-Rust implementation of the **XML-RPC** wire protocol: a serializer
//! (value → XML method call/response/fault), a streaming deserializer
//! (XML → value, over arbitrary chunk boundaries), and a minimal
//! transport-generic client/server pairing.
//!
//! The codec is built around an explicit [`Value`] tagged union and two
//! non-recursive algorithms: an iterative frame-stack tree walk on the
//! encode side and a mark-stack fold on the decode side, so adversarially
//! deep values never exhaust the call stack in either direction.
//!
//! ## Quick start
//!
//! ```rust
//! use xmlrpc_codec::{serialize_method_call, Deserializer, Value};
//!
//! let xml = serialize_method_call("pow", &[Value::Int(2), Value::Int(9)], None).unwrap();
//! let (method, params) = Deserializer::new()
//!     .deserialize_method_call(xml.as_bytes())
//!     .unwrap();
//! assert_eq!(method, "pow");
//! assert_eq!(params, vec![Value::Int(2), Value::Int(9)]);
//! ```
//!
//! ## Modules
//!
//! - [`value`] — the `Value` tagged union, `Fault`, and the `CustomType`
//!   extension capability
//! - [`serializer`] — value → XML documents
//! - [`deserializer`] — XML stream → values (single-use per message)
//! - [`date_formatter`] — the `dateTime.iso8601` ISO-8601 subset
//! - [`client`] / [`server`] — request/response pairing over a generic
//!   transport boundary
//! - [`error`] — error types for encode/decode failures and remote faults

pub mod client;
pub mod date_formatter;
pub mod deserializer;
pub mod error;
pub mod serializer;
pub mod server;
pub mod value;

pub use client::{Client, Transport};
pub use date_formatter::{DateFormatter, DateFormatterOptions};
pub use deserializer::Deserializer;
pub use error::{Result, XmlRpcError};
pub use serializer::{serialize_fault, serialize_method_call, serialize_method_response};
pub use server::{Server, FAULT_METHOD_NOT_FOUND, FAULT_PARSE_ERROR};
pub use value::{CustomText, CustomType, Fault, Value, XmlCursor};
