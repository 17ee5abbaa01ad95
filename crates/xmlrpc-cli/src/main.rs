//! `xmlrpc` CLI — encode and decode XML-RPC envelopes from the command
//! line, bridging params to and from JSON.
//!
//! ## Usage
//!
//! ```sh
//! # Encode a method call (params: JSON array on stdin)
//! echo '[2, 9]' | xmlrpc encode-call --method pow
//!
//! # Encode a method response (value: JSON on stdin)
//! echo '{"status":"ok"}' | xmlrpc encode-response
//!
//! # Encode a fault response
//! xmlrpc encode-fault --code 4 --message 'Too many parameters.'
//!
//! # Decode a call document to {"method": …, "params": […]}
//! xmlrpc decode-call -i call.xml
//!
//! # Decode a response document to its JSON value
//! xmlrpc decode-response -i response.xml
//! ```

mod json;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use xmlrpc_codec::{
    serialize_fault, serialize_method_call, serialize_method_response, Deserializer, Fault,
};

use crate::json::{json_to_value, value_to_json};

#[derive(Parser)]
#[command(name = "xmlrpc", version, about = "XML-RPC envelope encoder/decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a method call; params are a JSON array
    EncodeCall {
        /// Method name to call
        #[arg(short, long)]
        method: String,
        /// Encoding name for the XML declaration
        #[arg(long)]
        encoding: Option<String>,
        /// Input file with the JSON params array (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Encode a method response from a JSON value
    EncodeResponse {
        /// Input file with the JSON value (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Encode a fault response
    EncodeFault {
        /// faultCode value
        #[arg(short, long)]
        code: i32,
        /// faultString value
        #[arg(short, long)]
        message: String,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Decode a method call document
    DecodeCall {
        /// Input XML file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Decode a method response document
    DecodeResponse {
        /// Input XML file (stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::EncodeCall {
            method,
            encoding,
            input,
            output,
        } => {
            let raw = read_input(input.as_deref())?;
            let params: serde_json::Value =
                serde_json::from_str(&raw).context("params must be valid JSON")?;
            let params = match params {
                serde_json::Value::Array(items) => {
                    items.iter().map(json_to_value).collect::<Vec<_>>()
                }
                other => vec![json_to_value(&other)],
            };
            let xml = serialize_method_call(&method, &params, encoding.as_deref())
                .context("failed to encode the method call")?;
            write_output(output.as_deref(), &xml)?;
        }
        Commands::EncodeResponse { input, output } => {
            let raw = read_input(input.as_deref())?;
            let value: serde_json::Value =
                serde_json::from_str(&raw).context("value must be valid JSON")?;
            let xml = serialize_method_response(&json_to_value(&value))
                .context("failed to encode the method response")?;
            write_output(output.as_deref(), &xml)?;
        }
        Commands::EncodeFault {
            code,
            message,
            output,
        } => {
            let xml = serialize_fault(&Fault::new(code, message))
                .context("failed to encode the fault")?;
            write_output(output.as_deref(), &xml)?;
        }
        Commands::DecodeCall { input, output } => {
            let raw = read_input(input.as_deref())?;
            let (method, params) = Deserializer::new()
                .deserialize_method_call(raw.as_bytes())
                .context("failed to decode the method call")?;
            let doc = serde_json::json!({
                "method": method,
                "params": params.iter().map(value_to_json).collect::<Vec<_>>(),
            });
            write_output(output.as_deref(), &serde_json::to_string_pretty(&doc)?)?;
        }
        Commands::DecodeResponse { input, output } => {
            let raw = read_input(input.as_deref())?;
            let value = Deserializer::new()
                .deserialize_method_response(raw.as_bytes())
                .context("failed to decode the method response")?;
            let pretty = serde_json::to_string_pretty(&value_to_json(&value))?;
            write_output(output.as_deref(), &pretty)?;
        }
    }

    Ok(())
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
