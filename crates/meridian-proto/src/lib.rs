//! Wire protocol for Meridian RPC.
//!
//! Every request is a single self-describing message: a length-prefixed
//! call header naming the target service and method, followed by the raw
//! argument payload. The header is rkyv-serialised; argument and result
//! payloads are opaque bytes that only the endpoints parse (JSON via the
//! [`Message`] trait).
//!
//! # Wire Format
//!
//! ```text
//! ┌──────────────────────┬─────────────────────────┬──────────────────┐
//! │ header_length        │ CallHeader               │ argument payload │
//! │ (u32, little-endian) │ (header_length bytes,    │ (args_size bytes)│
//! │                      │  rkyv-serialised)        │                  │
//! └──────────────────────┴─────────────────────────┴──────────────────┘
//! ```
//!
//! The header names the target method, so a receiver knows which message
//! type to parse the argument bytes into before attempting to parse them,
//! and carries `args_size` so it knows when the frame is complete.
//! Responses carry only the serialised result message, with no envelope:
//! the caller already knows the expected result type, and the provider
//! closes the connection after sending, so end-of-stream marks the end of
//! the response.

pub mod codec;
mod error;
mod header;
mod message;

pub use codec::{
    decode_request, decode_response, encode_request, encode_response, try_decode_request,
    CallFrame, LEN_PREFIX_SIZE, MAX_ARGS_SIZE, MAX_HEADER_SIZE,
};
pub use error::ProtocolError;
pub use header::CallHeader;
pub use message::Message;
