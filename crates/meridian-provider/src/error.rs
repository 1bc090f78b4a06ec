//! Provider-side error types.

use thiserror::Error;

use meridian_core::{DiscoveryError, TransportError};
use meridian_proto::ProtocolError;

/// Errors resolving or invoking a method.
///
/// Every variant aborts the call without a response; the consumer observes
/// the connection closing with no payload.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// No service is registered under the requested name.
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// The service exists but has no method with the requested name.
    #[error("unknown method: {service}.{method}")]
    UnknownMethod { service: String, method: String },

    /// The argument bytes did not parse into the method's request type.
    #[error("argument parse error: {0}")]
    ArgsParse(String),
}

/// Errors from provider startup and serving.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Transport failure while binding or accepting.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Wire protocol failure.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Failure publishing to the discovery service.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
