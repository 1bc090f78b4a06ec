//! In-process discovery service for single-process wiring and tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tracing::{debug, info};

use super::{DiscoveryClient, DiscoveryError, Result};

#[derive(Debug, Clone)]
struct Node {
    value: String,
    /// Owning session for ephemeral nodes; `None` for durable nodes.
    session: Option<u64>,
}

#[derive(Debug, Default)]
struct Shared {
    nodes: DashMap<String, Node>,
    expired: DashSet<u64>,
    next_session: AtomicU64,
}

/// In-memory discovery service.
///
/// Models the coordination-service contract closely enough to exercise the
/// registration and resolution paths: durable nodes persist, ephemeral
/// nodes belong to a session and disappear when that session expires.
/// Session expiry is explicit ([`DiscoverySession::expire`]) rather than
/// heartbeat-driven, which also makes the stale-address window between a
/// provider dying and its session expiring directly testable.
#[derive(Debug, Clone, Default)]
pub struct MemoryDiscovery {
    shared: Arc<Shared>,
}

impl MemoryDiscovery {
    /// Creates an empty discovery service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session against this discovery service.
    #[must_use]
    pub fn connect(&self) -> DiscoverySession {
        let id = self.shared.next_session.fetch_add(1, Ordering::Relaxed);
        debug!(session = id, "discovery session opened");
        DiscoverySession {
            shared: Arc::clone(&self.shared),
            id,
        }
    }

    /// Returns the number of nodes currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.nodes.len()
    }

    /// Returns true if no nodes are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.nodes.is_empty()
    }
}

/// One session against the in-memory discovery service.
///
/// Cloning yields another handle to the same session.
#[derive(Debug, Clone)]
pub struct DiscoverySession {
    shared: Arc<Shared>,
    id: u64,
}

impl DiscoverySession {
    /// Ends this session, removing every ephemeral node it created.
    ///
    /// This is the in-memory equivalent of the coordination service
    /// detecting a lost provider: after expiry, consumers no longer
    /// resolve this session's addresses.
    pub fn expire(&self) {
        self.shared.expired.insert(self.id);
        let before = self.shared.nodes.len();
        self.shared
            .nodes
            .retain(|_, node| node.session != Some(self.id));
        info!(
            session = self.id,
            removed = before - self.shared.nodes.len(),
            "discovery session expired"
        );
    }

    fn check_alive(&self) -> Result<()> {
        if self.shared.expired.contains(&self.id) {
            return Err(DiscoveryError::SessionExpired);
        }
        Ok(())
    }
}

#[async_trait]
impl DiscoveryClient for DiscoverySession {
    async fn create_node(&self, path: &str, value: &str, ephemeral: bool) -> Result<()> {
        use dashmap::mapref::entry::Entry;

        self.check_alive()?;

        match self.shared.nodes.entry(path.to_owned()) {
            Entry::Occupied(mut entry) => match (entry.get().session.is_some(), ephemeral) {
                // Durable creation is idempotent.
                (false, false) => Ok(()),
                // A restarted provider re-publishes before the old node is
                // observed gone; the newest registration wins.
                (true, true) => {
                    entry.insert(Node {
                        value: value.to_owned(),
                        session: Some(self.id),
                    });
                    Ok(())
                }
                _ => Err(DiscoveryError::NodeExists(path.to_owned())),
            },
            Entry::Vacant(entry) => {
                debug!(session = self.id, path = %path, ephemeral, "discovery node created");
                entry.insert(Node {
                    value: value.to_owned(),
                    session: ephemeral.then_some(self.id),
                });
                Ok(())
            }
        }
    }

    async fn get_node(&self, path: &str) -> Result<Option<String>> {
        Ok(self.shared.nodes.get(path).map(|node| node.value.clone()))
    }
}
