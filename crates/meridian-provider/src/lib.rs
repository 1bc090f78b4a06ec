//! Provider side of Meridian RPC.
//!
//! A provider process registers service implementations, publishes every
//! (service, method) pair to the discovery service, then serves incoming
//! calls over TCP. Each accepted connection carries exactly one
//! call/response exchange and is torn down after the response is sent -
//! there is no connection reuse and no multiplexing.
//!
//! ```ignore
//! let mut provider = Provider::new(ProviderConfig::default(), discovery);
//! provider.register(Arc::new(UserService::default()));
//! provider.run(CancellationToken::new()).await?;
//! ```

pub mod config;
pub mod connection;
mod dispatch;
mod error;
pub mod registrar;
mod registry;
mod respond;
mod server;

pub use config::ProviderConfig;
pub use dispatch::Dispatcher;
pub use error::{DispatchError, ProviderError};
pub use registry::{MethodEntry, MethodFuture, RpcService, ServiceEntry, ServiceRegistry};
pub use respond::Responder;
pub use server::{BoundProvider, Provider};
