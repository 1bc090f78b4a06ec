//! The proxy call channel.
//!
//! A [`CallChannel`] turns a typed method call into the full consumer-side
//! sequence: resolve the provider address from discovery, connect, send
//! one request frame, read the response to end-of-stream, decode. Every
//! call resolves and connects afresh; there is no connection reuse, no
//! address cache, and no retry.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use meridian_core::discovery::method_path;
use meridian_core::{DiscoveryClient, ProviderAddress, TcpConnection};
use meridian_proto::{decode_response, encode_request, Message};

use crate::error::CallError;

/// Per-channel call options.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Upper bound on connect-through-response time for one call.
    ///
    /// `None` waits indefinitely. A call that hits the bound fails with
    /// [`CallError::Connection`]; there is no partial result.
    pub timeout: Option<Duration>,
}

/// Consumer-side channel for calling published methods.
///
/// Cheap to clone; clones share the discovery client.
#[derive(Clone)]
pub struct CallChannel {
    discovery: Arc<dyn DiscoveryClient>,
    options: CallOptions,
}

impl CallChannel {
    /// Creates a channel with default options (no timeout).
    #[must_use]
    pub fn new(discovery: Arc<dyn DiscoveryClient>) -> Self {
        Self {
            discovery,
            options: CallOptions::default(),
        }
    }

    /// Creates a channel with explicit options.
    #[must_use]
    pub fn with_options(discovery: Arc<dyn DiscoveryClient>, options: CallOptions) -> Self {
        Self { discovery, options }
    }

    /// Calls `service.method` with `args` and awaits the typed result.
    ///
    /// Blocks (asynchronously) until the response arrives or the call
    /// fails; the caller observes either a decoded `Resp` or a
    /// [`CallError`] naming what went wrong.
    pub async fn call<Req, Resp>(
        &self,
        service: &str,
        method: &str,
        args: &Req,
    ) -> Result<Resp, CallError>
    where
        Req: Message,
        Resp: Message,
    {
        let request = encode_request(service, method, args)
            .map_err(|e| CallError::Encoding(e.to_string()))?;

        let addr = self.resolve(service, method).await?;
        debug!(service = %service, method = %method, address = %addr, "calling");

        let exchange = exchange(&addr, &request);
        let response = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, exchange)
                .await
                .map_err(|_| CallError::Connection(format!("call timed out after {limit:?}")))??,
            None => exchange.await?,
        };

        decode_response(&response).map_err(|e| CallError::Decoding(e.to_string()))
    }

    /// Resolves the provider address for one method.
    async fn resolve(&self, service: &str, method: &str) -> Result<ProviderAddress, CallError> {
        let path = method_path(service, method);
        let value = self
            .discovery
            .get_node(&path)
            .await?
            .ok_or_else(|| CallError::ServiceUnavailable {
                service: service.to_owned(),
                method: method.to_owned(),
            })?;

        // A node whose value does not parse as an address is as good as
        // no node: the publication is unusable.
        value.parse().map_err(|e| {
            warn!(path = %path, value = %value, error = %e, "unusable published address");
            CallError::ServiceUnavailable {
                service: service.to_owned(),
                method: method.to_owned(),
            }
        })
    }
}

/// Runs one connect/send/receive exchange against a provider.
async fn exchange(addr: &ProviderAddress, request: &[u8]) -> Result<Vec<u8>, CallError> {
    let mut conn = TcpConnection::connect(addr)
        .await
        .map_err(|e| CallError::Connection(e.to_string()))?;

    conn.write_all(request)
        .await
        .map_err(|e| CallError::Connection(e.to_string()))?;

    // End-of-stream is the response delimiter.
    let mut response = Vec::new();
    conn.read_to_end(&mut response)
        .await
        .map_err(|e| CallError::Connection(e.to_string()))?;

    if response.is_empty() {
        return Err(CallError::Connection(
            "provider closed the connection without a response".to_owned(),
        ));
    }

    Ok(response)
}
