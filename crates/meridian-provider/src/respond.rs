//! Single-use completion handle for delivering a response.

use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

use meridian_core::Connection;
use meridian_proto::{encode_response, Message};

/// Completion handle passed into an invoked method's machinery.
///
/// Owns the connection for the remainder of the exchange. [`complete`]
/// consumes the handle, so delivering a second response is unrepresentable;
/// dropping it without completing closes the connection with no response,
/// which the consumer observes as a call failure.
///
/// The invoking method may run on any worker; completion is safe from
/// whichever task ends up holding the handle.
///
/// [`complete`]: Responder::complete
pub struct Responder {
    conn: Box<dyn Connection>,
}

impl Responder {
    /// Wraps a connection whose request has been fully received.
    #[must_use]
    pub fn new(conn: Box<dyn Connection>) -> Self {
        Self { conn }
    }

    /// Serialises the result, sends it, and closes the connection.
    ///
    /// The connection is shut down unconditionally afterwards: each
    /// connection serves exactly one exchange. Send and serialisation
    /// failures are logged; there is nothing further to report to, since
    /// the connection is the only channel back to the caller.
    pub async fn complete<M: Message>(mut self, result: &M) {
        match encode_response(result) {
            Ok(bytes) => {
                if let Err(e) = self.conn.write_all(&bytes).await {
                    warn!(error = %e, "failed to send response");
                }
            }
            Err(e) => error!(error = %e, "failed to serialise response"),
        }

        if let Err(e) = self.conn.shutdown().await {
            debug!(error = %e, "connection shutdown failed");
        }
    }
}
