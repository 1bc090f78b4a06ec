//! Publishes registered services to the discovery service.

use tracing::info;

use meridian_core::discovery::{method_path, service_path};
use meridian_core::{DiscoveryClient, DiscoveryError, ProviderAddress};

use crate::registry::ServiceRegistry;

/// Publishes every registered service and method.
///
/// Each service gets a durable node at `/<service>`; each method gets an
/// ephemeral child at `/<service>/<method>` whose value is the provider's
/// advertised address. The ephemeral nodes vanish with the discovery
/// session, so a dead provider stops resolving once its session expires.
///
/// Durable creation is idempotent, which lets several providers expose
/// methods of the same service.
pub async fn publish(
    discovery: &dyn DiscoveryClient,
    registry: &ServiceRegistry,
    addr: &ProviderAddress,
) -> Result<(), DiscoveryError> {
    let addr = addr.to_string();

    for entry in registry.entries() {
        discovery
            .create_node(&service_path(entry.name()), "", false)
            .await?;

        for method in entry.method_names() {
            discovery
                .create_node(&method_path(entry.name(), method), &addr, true)
                .await?;
            info!(service = %entry.name(), method = %method, address = %addr, "method published");
        }
    }

    Ok(())
}
