//! Consumer-side error types.

use thiserror::Error;

use meridian_core::DiscoveryError;

/// Errors a call through a [`CallChannel`] can surface.
///
/// [`CallChannel`]: crate::CallChannel
#[derive(Error, Debug)]
pub enum CallError {
    /// No provider is currently published for the method.
    #[error("no provider available for {service}.{method}")]
    ServiceUnavailable { service: String, method: String },

    /// Connecting, sending, or awaiting the response failed.
    ///
    /// Covers the provider closing without a response, a stale discovery
    /// address whose provider is gone, and call timeouts. All of these
    /// mean the same thing to the caller: the call did not complete, and
    /// retrying after re-resolution is the sensible move.
    #[error("connection error: {0}")]
    Connection(String),

    /// The arguments could not be serialised.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// The response bytes did not parse into the expected result type.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// The discovery lookup itself failed.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
}
