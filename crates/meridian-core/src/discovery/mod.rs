//! Discovery-service client abstraction.
//!
//! Providers publish one durable node per service (`/<service>`) and one
//! ephemeral child per method (`/<service>/<method>`) whose value is the
//! provider's `"<host>:<port>"` address. Ephemeral nodes are removed when
//! the creating session ends, so consumers stop resolving dead providers
//! once the session is confirmed gone. A narrow race remains between
//! process death and session expiry; consumers must treat a connection
//! refusal on a stale address as retryable, exactly like a missing node.

mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::{DiscoverySession, MemoryDiscovery};

/// Errors that can occur during discovery operations.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The session backing this client is no longer valid.
    #[error("discovery session expired")]
    SessionExpired,

    /// An ephemeral node already exists under a live session.
    #[error("node already exists: {0}")]
    NodeExists(String),

    /// Backend communication failure.
    #[error("discovery backend error: {0}")]
    Backend(String),
}

/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Client for the external coordination service.
///
/// Implementations maintain a session; ephemeral nodes created through a
/// session are removed automatically when that session ends.
#[async_trait]
pub trait DiscoveryClient: Send + Sync {
    /// Creates a node at `path` holding `value`.
    ///
    /// Durable creation is idempotent: creating an already-existing durable
    /// node succeeds without modifying it.
    async fn create_node(&self, path: &str, value: &str, ephemeral: bool) -> Result<()>;

    /// Reads a node value. Returns `None` when no node exists at `path`.
    async fn get_node(&self, path: &str) -> Result<Option<String>>;
}

/// Discovery path for a service: `/<service_name>`.
#[must_use]
pub fn service_path(service_name: &str) -> String {
    format!("/{service_name}")
}

/// Discovery path for a method: `/<service_name>/<method_name>`.
#[must_use]
pub fn method_path(service_name: &str, method_name: &str) -> String {
    format!("/{service_name}/{method_name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_layout() {
        assert_eq!(service_path("UserService"), "/UserService");
        assert_eq!(method_path("UserService", "Login"), "/UserService/Login");
    }
}
