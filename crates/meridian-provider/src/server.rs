//! Provider server: bind, publish, accept loop.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use meridian_core::transport::Listener;
use meridian_core::{DiscoveryClient, ProviderAddress, TcpListener};

use crate::config::ProviderConfig;
use crate::connection;
use crate::dispatch::Dispatcher;
use crate::error::ProviderError;
use crate::registrar;
use crate::registry::{RpcService, ServiceRegistry};

/// A provider being assembled: register services, then bind and serve.
pub struct Provider {
    config: ProviderConfig,
    registry: ServiceRegistry,
    discovery: Arc<dyn DiscoveryClient>,
}

impl Provider {
    /// Creates a provider with no services registered yet.
    #[must_use]
    pub fn new(config: ProviderConfig, discovery: Arc<dyn DiscoveryClient>) -> Self {
        Self {
            config,
            registry: ServiceRegistry::new(),
            discovery,
        }
    }

    /// Registers a service implementation.
    ///
    /// Must happen before [`bind`]; the registry is frozen once serving
    /// starts.
    ///
    /// [`bind`]: Provider::bind
    pub fn register(&mut self, service: Arc<dyn RpcService>) {
        self.registry.register(service);
    }

    /// Binds the listener and publishes every registered method.
    ///
    /// Publication happens after the bind so the advertised address
    /// carries the real port even when the config asked for port 0.
    pub async fn bind(self) -> Result<BoundProvider, ProviderError> {
        let listener = TcpListener::bind(&self.config.host, self.config.port).await?;
        let local = listener.local_addr()?;
        let advertised = ProviderAddress::new(self.config.advertised_host(), local.port());

        registrar::publish(self.discovery.as_ref(), &self.registry, &advertised).await?;

        info!(
            address = %advertised,
            services = self.registry.len(),
            "provider listening"
        );

        Ok(BoundProvider {
            listener,
            dispatcher: Arc::new(Dispatcher::new(Arc::new(self.registry))),
            advertised,
        })
    }

    /// Binds, publishes, and serves until `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), ProviderError> {
        self.bind().await?.serve(cancel).await;
        Ok(())
    }
}

/// A provider that is bound and published, ready to accept calls.
pub struct BoundProvider {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    advertised: ProviderAddress,
}

impl BoundProvider {
    /// The address published to discovery.
    #[must_use]
    pub fn address(&self) -> &ProviderAddress {
        &self.advertised
    }

    /// Accepts connections until `cancel` fires.
    ///
    /// Each connection is served on its own task; in-flight calls are not
    /// awaited on shutdown, matching the one-shot connection model where a
    /// dropped connection is an ordinary call failure for the consumer.
    pub async fn serve(self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(address = %self.advertised, "provider shutting down");
                    return;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => {
                        let dispatcher = Arc::clone(&self.dispatcher);
                        tokio::spawn(connection::serve(dispatcher, conn));
                    }
                    Err(e) => warn!(error = %e, "accept failed"),
                },
            }
        }
    }
}
