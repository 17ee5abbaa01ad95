//! Error types for XML-RPC encoding and decoding operations.

use thiserror::Error;

/// Errors that can occur while encoding or decoding XML-RPC messages.
///
/// The taxonomy mirrors the four failure classes of the wire protocol:
/// lexical XML errors ([`XmlRpcError::Xml`]), structural/protocol errors
/// (unknown tags, wrong envelope, multi-value responses), value-format
/// errors (illegal boolean/int/double/date literals), and remote faults
/// ([`XmlRpcError::Fault`], a well-formed `<fault>` envelope rather than a
/// protocol failure).
#[derive(Error, Debug)]
pub enum XmlRpcError {
    /// The XML tokenizer reported a lexical error. Fatal to the message.
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A tag name outside the XML-RPC vocabulary was closed.
    #[error("Unknown XML-RPC tag '{0}'")]
    UnknownTag(String),

    /// The document ended with no envelope type or with unclosed
    /// array/struct markers.
    #[error("Invalid XML-RPC message")]
    InvalidMessage,

    /// `deserialize_method_call` was fed something other than a
    /// `<methodCall>` document.
    #[error("Not a method call")]
    NotMethodCall,

    /// The method call envelope closed without a `<methodName>`.
    #[error("Method call did not contain a method name")]
    MissingMethodName,

    /// `deserialize_method_response` was fed something other than a
    /// `<methodResponse>` document.
    #[error("Not a method response")]
    NotMethodResponse,

    /// The response closed without a `<params>` or `<fault>` section, or
    /// carried no value at all.
    #[error("Invalid method response")]
    InvalidMethodResponse,

    /// A `<methodResponse>` carried more than one `<param>`.
    #[error("Response has more than one param")]
    MoreThanOneParam,

    /// `<boolean>` text other than `1` or `0`.
    #[error("Illegal boolean value '{0}'")]
    IllegalBoolean(String),

    /// `<int>`/`<i4>` text that is not a 32-bit integer literal.
    #[error("Expected an integer but got '{0}'")]
    ExpectedInteger(String),

    /// `<i8>` text that is not an integer literal.
    #[error("Expected integer (I8) value but got '{0}'")]
    ExpectedI8(String),

    /// `<double>` text that is not a floating-point literal.
    #[error("Expected a double but got '{0}'")]
    ExpectedDouble(String),

    /// `<dateTime.iso8601>` text outside the accepted ISO-8601 superset.
    #[error("Expected an ISO-8601 date time but got '{0}'")]
    ExpectedDateTime(String),

    /// `<base64>` content that is not valid standard-alphabet base64.
    #[error("base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    /// A well-formed remote fault response carrying `faultCode` and
    /// `faultString`. An application-level error, not a protocol failure.
    #[error("XML-RPC fault: {fault_string}")]
    Fault {
        fault_code: i32,
        fault_string: String,
    },

    /// Transport-level failure raised by a [`crate::client::Transport`]
    /// implementation.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

/// Convenience alias used throughout xmlrpc-codec.
pub type Result<T> = std::result::Result<T, XmlRpcError>;
