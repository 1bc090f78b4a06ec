//! Consumer side of Meridian RPC.
//!
//! A consumer resolves the provider for a (service, method) pair through
//! the discovery service, opens a TCP connection, sends one request frame,
//! and reads the response until the provider closes the connection. The
//! [`CallChannel`] wraps that sequence behind a typed async call:
//!
//! ```ignore
//! let channel = CallChannel::new(discovery);
//! let response: LoginResponse = channel
//!     .call("UserService", "Login", &request)
//!     .await?;
//! ```

mod channel;
pub mod config;
mod error;

pub use channel::{CallChannel, CallOptions};
pub use config::{ClientConfig, ConfigError};
pub use error::CallError;
