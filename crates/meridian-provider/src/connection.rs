//! Per-connection request handling.
//!
//! Each accepted connection carries exactly one call. The handler
//! accumulates bytes until a full frame decodes, hands the call to the
//! dispatcher, and lets the responder close the connection once the
//! response is written. Any protocol failure closes the connection
//! without a response.

use std::sync::Arc;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tracing::{debug, warn};

use meridian_core::Connection;
use meridian_proto::{decode_request, try_decode_request, CallFrame};

use crate::dispatch::Dispatcher;
use crate::respond::Responder;

const READ_CHUNK: usize = 4 * 1024;

/// Serves one connection from accept to close.
pub async fn serve(dispatcher: Arc<Dispatcher>, mut conn: Box<dyn Connection>) {
    let frame = match read_request(&mut conn).await {
        Some(frame) => frame,
        None => return,
    };

    debug!(
        service = %frame.service_name,
        method = %frame.method_name,
        args_len = frame.args.len(),
        "call received"
    );

    let responder = Responder::new(conn);
    if let Err(e) = dispatcher.dispatch(frame, responder).await {
        warn!(error = %e, "call aborted without response");
    }
}

/// Reads until one complete request frame decodes.
///
/// Returns `None` when the connection is unusable: the peer closed before
/// a full frame arrived, the bytes are permanently malformed, or the read
/// itself failed. Bytes past the first frame are ignored.
async fn read_request(conn: &mut Box<dyn Connection>) -> Option<CallFrame> {
    let mut buf = BytesMut::with_capacity(READ_CHUNK);

    loop {
        match try_decode_request(&buf) {
            Ok(Some(frame)) => return Some(frame),
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "malformed request, closing without response");
                return None;
            }
        }

        match conn.read_buf(&mut buf).await {
            Ok(0) => {
                if buf.is_empty() {
                    debug!("connection closed before any request");
                } else {
                    // EOF mid-frame: run the strict decoder so the log
                    // names the exact truncation point.
                    match decode_request(&buf) {
                        Err(e) => warn!(error = %e, "connection closed mid-frame"),
                        Ok(_) => warn!("connection closed mid-frame"),
                    }
                }
                return None;
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "read error on connection");
                return None;
            }
        }
    }
}
