//! Error types for the wire protocol.

use thiserror::Error;

/// Wire protocol errors.
///
/// Decode failures are terminal for the connection they occur on: the
/// receiver logs the error and closes without sending a response.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The buffer ended before the 4-byte length prefix.
    #[error("malformed frame: missing length prefix")]
    MalformedFrame,

    /// The call header was incomplete or failed to parse.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The argument payload was shorter than the header advertised.
    #[error("truncated arguments: have {have} bytes, header advertised {need}")]
    TruncatedArgs { have: usize, need: usize },

    /// A header or message could not be serialised.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A result payload could not be parsed.
    #[error("decoding error: {0}")]
    Decoding(String),
}
