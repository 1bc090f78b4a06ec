//! TCP transport for call/response exchanges.
//!
//! The transport guarantees ordered, uncorrupted byte delivery within one
//! connection and nothing more; framing and message boundaries belong to
//! the protocol layer. A logical message may arrive split across any
//! number of reads.

use std::net::SocketAddr;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener as TokioTcpListener, TcpStream};

use crate::address::ProviderAddress;

/// Errors that can occur during transport operations.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    /// I/O error from the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection was refused by the remote endpoint.
    ///
    /// A consumer resolving a stale discovery address lands here: the
    /// ephemeral node still exists but the provider behind it is gone.
    #[error("connection refused: {0}")]
    ConnectionRefused(String),
}

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// A bidirectional byte-stream connection.
///
/// Blanket-implemented so in-memory duplex streams can stand in for TCP
/// sockets in tests.
pub trait Connection: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

/// A listener that accepts incoming connections.
#[async_trait]
pub trait Listener: Send + Sync {
    /// Accepts the next incoming connection.
    async fn accept(&self) -> Result<Box<dyn Connection>>;

    /// Returns the local address this listener is bound to.
    fn local_addr(&self) -> Result<SocketAddr>;
}

/// TCP listener for the provider side.
#[derive(Debug)]
pub struct TcpListener {
    inner: TokioTcpListener,
}

impl TcpListener {
    /// Binds to `host:port`. Port 0 selects an ephemeral port; read it
    /// back with [`Listener::local_addr`].
    pub async fn bind(host: &str, port: u16) -> Result<Self> {
        let inner = TokioTcpListener::bind((host, port)).await?;
        Ok(Self { inner })
    }
}

#[async_trait]
impl Listener for TcpListener {
    async fn accept(&self) -> Result<Box<dyn Connection>> {
        let (stream, _peer) = self.inner.accept().await?;
        Ok(Box::new(stream))
    }

    fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.inner.local_addr()?)
    }
}

/// TCP connection for the consumer side.
#[derive(Debug)]
pub struct TcpConnection;

impl TcpConnection {
    /// Connects to a resolved provider address.
    pub async fn connect(addr: &ProviderAddress) -> Result<TcpStream> {
        TcpStream::connect((addr.host.as_str(), addr.port))
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::ConnectionRefused {
                    TransportError::ConnectionRefused(addr.to_string())
                } else {
                    TransportError::Io(e)
                }
            })
    }
}
