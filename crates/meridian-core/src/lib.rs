//! Shared infrastructure for Meridian RPC.
//!
//! This crate provides the two external collaborators the protocol core
//! depends on, specified at their interface:
//!
//! - **Transport**: TCP listener/connection abstraction with ordered,
//!   uncorrupted byte delivery per connection
//! - **Discovery**: coordination-service client for publishing and
//!   resolving provider addresses, with session-scoped ephemeral nodes

mod address;
pub mod discovery;
pub mod transport;

pub use address::{AddressParseError, ProviderAddress};
pub use discovery::{DiscoveryClient, DiscoveryError, DiscoverySession, MemoryDiscovery};
pub use transport::{Connection, Listener, TcpConnection, TcpListener, TransportError};
