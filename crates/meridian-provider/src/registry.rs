//! Service registry and reflective method descriptors.
//!
//! Calls arrive as (service name, method name) strings; the registry maps
//! that pair to a type-erased invocation descriptor built from a typed
//! async method at registration time. The descriptor alone knows the
//! method's request type, so argument parsing lives inside it - the
//! dispatch path needs no runtime type inspection beyond the name lookup.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::info;

use meridian_proto::Message;

use crate::error::DispatchError;
use crate::respond::Responder;

/// Future driving one method invocation to completion.
///
/// Resolves once the method has produced its result and the responder has
/// sent it (or the send was abandoned on error).
pub type MethodFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type MethodHandler =
    Arc<dyn Fn(&[u8], Responder) -> Result<MethodFuture, DispatchError> + Send + Sync>;

/// A service implementation that can be registered with a provider.
///
/// This is the service-description capability: it names the service and
/// enumerates its callable methods. Method entries capture the service
/// instance, so they stay valid for the life of the registry.
pub trait RpcService: Send + Sync + 'static {
    /// The name consumers address this service by.
    fn service_name(&self) -> &str;

    /// Builds the invocation descriptors for every method of this service.
    fn methods(self: Arc<Self>) -> Vec<MethodEntry>;
}

/// Invocation descriptor for one method.
pub struct MethodEntry {
    name: &'static str,
    handler: MethodHandler,
}

impl MethodEntry {
    /// Wraps a typed async method into a type-erased descriptor.
    ///
    /// The returned entry parses argument bytes into `Req`, runs the
    /// method, and completes the responder with the `Resp` it produces.
    pub fn new<Req, Resp, F, Fut>(name: &'static str, method: F) -> Self
    where
        Req: Message,
        Resp: Message + Sync,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Resp> + Send + 'static,
    {
        let handler: MethodHandler = Arc::new(move |args, responder| {
            let request =
                Req::from_payload(args).map_err(|e| DispatchError::ArgsParse(e.to_string()))?;
            let invocation = method(request);
            Ok(Box::pin(async move {
                let response = invocation.await;
                responder.complete(&response).await;
            }) as MethodFuture)
        });

        Self { name, handler }
    }

    /// The method name consumers address this entry by.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Parses the argument bytes and begins the invocation.
    ///
    /// Fails with [`DispatchError::ArgsParse`] before the method is ever
    /// entered; the responder is dropped in that case and the connection
    /// closes without a response.
    pub fn invoke(
        &self,
        args: &[u8],
        responder: Responder,
    ) -> Result<MethodFuture, DispatchError> {
        (self.handler)(args, responder)
    }
}

impl std::fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodEntry").field("name", &self.name).finish()
    }
}

/// One registered service: its instance and its method table.
pub struct ServiceEntry {
    name: String,
    instance: Arc<dyn RpcService>,
    methods: HashMap<&'static str, MethodEntry>,
}

impl ServiceEntry {
    /// The registered service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The registered service instance.
    #[must_use]
    pub fn instance(&self) -> &Arc<dyn RpcService> {
        &self.instance
    }

    /// Names of every registered method, for discovery publication.
    pub fn method_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.keys().copied()
    }
}

/// Provider-side registry mapping (service, method) names to descriptors.
///
/// Built once at startup before the listener starts, then shared read-only
/// across connection workers - concurrent lookups need no locking.
#[derive(Default)]
pub struct ServiceRegistry {
    services: HashMap<String, ServiceEntry>,
}

impl ServiceRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a service, introspecting its method set.
    ///
    /// The last registration for a given name wins.
    pub fn register(&mut self, service: Arc<dyn RpcService>) {
        let name = service.service_name().to_owned();
        let methods: HashMap<&'static str, MethodEntry> = Arc::clone(&service)
            .methods()
            .into_iter()
            .map(|entry| (entry.name(), entry))
            .collect();

        info!(service = %name, methods = methods.len(), "service registered");

        self.services.insert(
            name.clone(),
            ServiceEntry {
                name,
                instance: service,
                methods,
            },
        );
    }

    /// Looks up the descriptor for `service_name.method_name`.
    pub fn resolve(
        &self,
        service_name: &str,
        method_name: &str,
    ) -> Result<&MethodEntry, DispatchError> {
        let entry = self
            .services
            .get(service_name)
            .ok_or_else(|| DispatchError::UnknownService(service_name.to_owned()))?;

        entry
            .methods
            .get(method_name)
            .ok_or_else(|| DispatchError::UnknownMethod {
                service: service_name.to_owned(),
                method: method_name.to_owned(),
            })
    }

    /// Iterates over every registered service, for discovery publication.
    pub fn entries(&self) -> impl Iterator<Item = &ServiceEntry> {
        self.services.values()
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns true if no services are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
