//! Routes decoded call frames to registered methods.

use std::sync::Arc;

use crate::error::DispatchError;
use crate::registry::ServiceRegistry;
use crate::respond::Responder;

use meridian_proto::CallFrame;

/// Provider-side method dispatcher.
///
/// Resolution and argument parsing happen before any method is entered:
/// an unknown service or method, or unparseable arguments, abort the call
/// with the responder dropped and no handler ever invoked. The dispatcher
/// performs no retries and applies no timeout - execution time belongs to
/// the service implementation.
pub struct Dispatcher {
    registry: Arc<ServiceRegistry>,
}

impl Dispatcher {
    /// Creates a dispatcher over a fully built registry.
    #[must_use]
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }

    /// Dispatches one decoded call and drives it to completion.
    ///
    /// On success the invoked method has produced its result and the
    /// responder has sent it and closed the connection. On error the
    /// responder was dropped, closing the connection without a response.
    pub async fn dispatch(
        &self,
        frame: CallFrame,
        responder: Responder,
    ) -> Result<(), DispatchError> {
        let entry = self
            .registry
            .resolve(&frame.service_name, &frame.method_name)?;

        let invocation = entry.invoke(&frame.args, responder)?;
        invocation.await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MethodEntry, RpcService};

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde::{Deserialize, Serialize};
    use tokio::io::AsyncReadExt;

    use meridian_proto::Message;

    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    struct Echo {
        text: String,
    }

    /// Test service counting how often each method body runs.
    struct CountingService {
        name: &'static str,
        method_names: Vec<&'static str>,
        invocations: Arc<AtomicUsize>,
    }

    impl RpcService for CountingService {
        fn service_name(&self) -> &str {
            self.name
        }

        fn methods(self: Arc<Self>) -> Vec<MethodEntry> {
            self.method_names
                .iter()
                .map(|name| {
                    let invocations = Arc::clone(&self.invocations);
                    MethodEntry::new(*name, move |req: Echo| {
                        let invocations = Arc::clone(&invocations);
                        async move {
                            invocations.fetch_add(1, Ordering::SeqCst);
                            req
                        }
                    })
                })
                .collect()
        }
    }

    struct Fixture {
        dispatcher: Dispatcher,
        invocations_a: Arc<AtomicUsize>,
        invocations_b: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let invocations_a = Arc::new(AtomicUsize::new(0));
        let invocations_b = Arc::new(AtomicUsize::new(0));

        let mut registry = ServiceRegistry::new();
        registry.register(Arc::new(CountingService {
            name: "A",
            method_names: vec!["f", "g"],
            invocations: Arc::clone(&invocations_a),
        }));
        registry.register(Arc::new(CountingService {
            name: "B",
            method_names: vec!["h"],
            invocations: Arc::clone(&invocations_b),
        }));

        Fixture {
            dispatcher: Dispatcher::new(Arc::new(registry)),
            invocations_a,
            invocations_b,
        }
    }

    fn frame(service: &str, method: &str, args: Vec<u8>) -> CallFrame {
        CallFrame {
            service_name: service.to_owned(),
            method_name: method.to_owned(),
            args,
        }
    }

    fn responder() -> (Responder, tokio::io::DuplexStream) {
        let (provider_side, consumer_side) = tokio::io::duplex(1024);
        (Responder::new(Box::new(provider_side)), consumer_side)
    }

    #[tokio::test]
    async fn dispatch_invokes_only_the_target_method() {
        let fx = fixture();
        let args = Echo {
            text: "hi".to_owned(),
        }
        .to_payload()
        .unwrap();

        let (responder, mut consumer) = responder();
        fx.dispatcher
            .dispatch(frame("B", "h", args), responder)
            .await
            .unwrap();

        assert_eq!(fx.invocations_b.load(Ordering::SeqCst), 1);
        assert_eq!(fx.invocations_a.load(Ordering::SeqCst), 0);

        let mut received = Vec::new();
        consumer.read_to_end(&mut received).await.unwrap();
        let echoed: Echo = meridian_proto::decode_response(&received).unwrap();
        assert_eq!(echoed.text, "hi");
    }

    #[tokio::test]
    async fn unknown_service_invokes_nothing() {
        let fx = fixture();
        let args = Echo::default().to_payload().unwrap();

        let (responder, mut consumer) = responder();
        let err = fx
            .dispatcher
            .dispatch(frame("C", "f", args), responder)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::UnknownService(_)));
        assert_eq!(fx.invocations_a.load(Ordering::SeqCst), 0);
        assert_eq!(fx.invocations_b.load(Ordering::SeqCst), 0);

        // Connection closed without any response bytes.
        let mut received = Vec::new();
        consumer.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn unknown_method_aborts_without_invoking() {
        let fx = fixture();
        let args = Echo::default().to_payload().unwrap();

        let (responder, mut consumer) = responder();
        let err = fx
            .dispatcher
            .dispatch(frame("A", "z", args), responder)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::UnknownMethod { .. }));
        assert_eq!(fx.invocations_a.load(Ordering::SeqCst), 0);

        let mut received = Vec::new();
        consumer.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty());
    }

    #[tokio::test]
    async fn unparseable_args_abandon_the_call() {
        let fx = fixture();

        let (responder, mut consumer) = responder();
        let err = fx
            .dispatcher
            .dispatch(frame("A", "f", b"\xff not json".to_vec()), responder)
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::ArgsParse(_)));
        assert_eq!(fx.invocations_a.load(Ordering::SeqCst), 0);

        let mut received = Vec::new();
        consumer.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty());
    }
}
