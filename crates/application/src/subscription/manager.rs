//! Connection manager holding one live subscription per protocol.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use graphit_domain::{SubscriptionMessage, SubscriptionOptions, SubscriptionProtocol, SubscriptionRequest};
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{SubscriptionListener, resolve_subscription};
use crate::ports::{SubscriptionConnection, SubscriptionTransport, TransportEvent};

type Slots = Mutex<HashMap<SubscriptionProtocol, ActiveSubscription>>;

struct ActiveSubscription {
    id: u64,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl ActiveSubscription {
    /// Signals the task and waits until it has closed its connection.
    async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            warn!(error = %e, "Subscription task ended abnormally");
        }
    }
}

/// Owns the live subscriptions of one session.
///
/// Subscribing on a protocol that already has a live connection closes the
/// old connection first.
pub struct SubscriptionManager {
    transports: HashMap<SubscriptionProtocol, Arc<dyn SubscriptionTransport>>,
    slots: Arc<Slots>,
    next_id: AtomicU64,
}

impl Default for SubscriptionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionManager {
    /// Creates a manager with no transports.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transports: HashMap::new(),
            slots: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    /// Registers a transport under its protocol, replacing any previous one.
    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn SubscriptionTransport>) -> Self {
        self.transports.insert(transport.protocol(), transport);
        self
    }

    /// Opens a subscription.
    ///
    /// Failures are delivered through `listener` as an error message plus
    /// `on_error`; the returned handle is then inert.
    pub async fn subscribe(
        &self,
        options: &SubscriptionOptions,
        listener: Arc<dyn SubscriptionListener>,
    ) -> SubscriptionHandle {
        let protocol = options.protocol;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = SubscriptionHandle {
            id,
            protocol,
            slots: Arc::downgrade(&self.slots),
        };

        let prior = self.slots.lock().await.remove(&protocol);
        if let Some(prior) = prior {
            info!(%protocol, "Replacing active subscription");
            prior.stop().await;
        }

        let Some(transport) = self.transports.get(&protocol).cloned() else {
            report_error(listener.as_ref(), &format!("No transport for protocol {protocol}"));
            return handle;
        };

        let request = match resolve_subscription(options) {
            Ok(request) => request,
            Err(e) => {
                report_error(listener.as_ref(), &e.to_string());
                return handle;
            }
        };

        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run_subscription(transport, request, listener, shutdown_rx));

        let replaced = self
            .slots
            .lock()
            .await
            .insert(protocol, ActiveSubscription { id, shutdown, task });
        if let Some(replaced) = replaced {
            replaced.stop().await;
        }

        handle
    }

    /// Closes every live subscription.
    pub async fn disconnect_all(&self) {
        let active: Vec<ActiveSubscription> = self.slots.lock().await.drain().map(|(_, a)| a).collect();
        if !active.is_empty() {
            info!(count = active.len(), "Disconnecting all subscriptions");
        }
        for subscription in active {
            subscription.stop().await;
        }
    }

    /// Returns true while a subscription on `protocol` is running.
    pub async fn is_active(&self, protocol: SubscriptionProtocol) -> bool {
        self.slots
            .lock()
            .await
            .get(&protocol)
            .is_some_and(|a| !a.task.is_finished())
    }
}

/// Handle to one subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    id: u64,
    protocol: SubscriptionProtocol,
    slots: Weak<Slots>,
}

impl SubscriptionHandle {
    /// The protocol this subscription runs on.
    #[must_use]
    pub const fn protocol(&self) -> SubscriptionProtocol {
        self.protocol
    }

    /// Closes the subscription and waits until its connection is released.
    ///
    /// Calling it again, or after the subscription was replaced, does nothing.
    pub async fn unsubscribe(&self) {
        let Some(slots) = self.slots.upgrade() else {
            return;
        };

        let active = {
            let mut slots = slots.lock().await;
            match slots.get(&self.protocol) {
                Some(active) if active.id == self.id => slots.remove(&self.protocol),
                _ => None,
            }
        };

        if let Some(active) = active {
            debug!(protocol = %self.protocol, "Unsubscribing");
            active.stop().await;
        }
    }
}

fn report_error(listener: &dyn SubscriptionListener, error: &str) {
    warn!(error, "Subscription error");
    listener.on_message(&SubscriptionMessage::error(error));
    listener.on_error(error);
}

async fn run_subscription(
    transport: Arc<dyn SubscriptionTransport>,
    request: SubscriptionRequest,
    listener: Arc<dyn SubscriptionListener>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let protocol = request.protocol;
    debug!(%protocol, url = %request.url, "Connecting subscription");

    let mut connection = tokio::select! {
        biased;
        _ = &mut shutdown => return,
        result = transport.connect(&request) => match result {
            Ok(connection) => connection,
            Err(e) => {
                report_error(listener.as_ref(), &e.to_string());
                return;
            }
        },
    };

    info!(%protocol, "Subscription connected");
    listener.on_connected();
    listener.on_message(&SubscriptionMessage::connection(protocol));

    stream_events(connection.as_mut(), listener.as_ref(), &mut shutdown).await;
    connection.close().await;
    debug!(%protocol, "Subscription connection closed");
}

async fn stream_events(
    connection: &mut dyn SubscriptionConnection,
    listener: &dyn SubscriptionListener,
    shutdown: &mut oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut *shutdown => return,
            event = connection.next_event() => match event {
                Some(TransportEvent::Data(payload)) => {
                    listener.on_message(&SubscriptionMessage::data(payload));
                }
                Some(TransportEvent::Error(error)) => {
                    report_error(listener, &error);
                    return;
                }
                Some(TransportEvent::Complete) | None => {
                    info!("Subscription completed by server");
                    listener.on_message(&SubscriptionMessage::complete());
                    listener.on_complete();
                    return;
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use async_trait::async_trait;
    use graphit_domain::SubscriptionMessageType;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::sync::mpsc;

    use crate::ports::SubscriptionError;

    /// In-memory transport; tests push events into the latest connection.
    struct FakeTransport {
        protocol: SubscriptionProtocol,
        live: Arc<AtomicUsize>,
        opened: AtomicUsize,
        feeds: StdMutex<Vec<mpsc::UnboundedSender<TransportEvent>>>,
        fail_with: Option<SubscriptionError>,
    }

    impl FakeTransport {
        fn new(protocol: SubscriptionProtocol) -> Arc<Self> {
            Arc::new(Self {
                protocol,
                live: Arc::new(AtomicUsize::new(0)),
                opened: AtomicUsize::new(0),
                feeds: StdMutex::new(Vec::new()),
                fail_with: None,
            })
        }

        fn failing(protocol: SubscriptionProtocol, error: SubscriptionError) -> Arc<Self> {
            Arc::new(Self {
                protocol,
                live: Arc::new(AtomicUsize::new(0)),
                opened: AtomicUsize::new(0),
                feeds: StdMutex::new(Vec::new()),
                fail_with: Some(error),
            })
        }

        fn live(&self) -> usize {
            self.live.load(Ordering::SeqCst)
        }

        fn send(&self, event: TransportEvent) {
            let feeds = self.feeds.lock().unwrap();
            feeds.last().unwrap().send(event).unwrap();
        }
    }

    struct FakeConnection {
        events: mpsc::UnboundedReceiver<TransportEvent>,
        live: Arc<AtomicUsize>,
        closed: bool,
    }

    #[async_trait]
    impl SubscriptionConnection for FakeConnection {
        async fn next_event(&mut self) -> Option<TransportEvent> {
            self.events.recv().await
        }

        async fn close(&mut self) {
            if !self.closed {
                self.closed = true;
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    #[async_trait]
    impl SubscriptionTransport for FakeTransport {
        fn protocol(&self) -> SubscriptionProtocol {
            self.protocol
        }

        async fn connect(
            &self,
            _request: &SubscriptionRequest,
        ) -> Result<Box<dyn SubscriptionConnection>, SubscriptionError> {
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }
            let (tx, rx) = mpsc::unbounded_channel();
            self.feeds.lock().unwrap().push(tx);
            self.opened.fetch_add(1, Ordering::SeqCst);
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeConnection {
                events: rx,
                live: Arc::clone(&self.live),
                closed: false,
            }))
        }
    }

    /// Forwards callbacks as labelled lines.
    struct Recorder(mpsc::UnboundedSender<String>);

    impl SubscriptionListener for Recorder {
        fn on_message(&self, message: &SubscriptionMessage) {
            let label = match message.message_type {
                SubscriptionMessageType::Data => format!("data {}", message.payload),
                SubscriptionMessageType::Error => format!("error-message {}", message.payload["message"]),
                SubscriptionMessageType::Complete => "complete-message".to_string(),
                SubscriptionMessageType::Connection => "connection-message".to_string(),
            };
            let _ = self.0.send(label);
        }

        fn on_connected(&self) {
            let _ = self.0.send("connected".to_string());
        }

        fn on_error(&self, error: &str) {
            let _ = self.0.send(format!("on_error {error}"));
        }

        fn on_complete(&self) {
            let _ = self.0.send("on_complete".to_string());
        }
    }

    fn recorder() -> (Arc<dyn SubscriptionListener>, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Recorder(tx)), rx)
    }

    async fn next(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap()
    }

    fn options(protocol: SubscriptionProtocol) -> SubscriptionOptions {
        SubscriptionOptions::new("https://x.test/graphql", "subscription { tick }", protocol)
    }

    #[tokio::test]
    async fn test_events_are_normalized_in_order() {
        let transport = FakeTransport::new(SubscriptionProtocol::Ws);
        let manager = SubscriptionManager::new().with_transport(transport.clone());
        let (listener, mut rx) = recorder();

        let _handle = manager.subscribe(&options(SubscriptionProtocol::Ws), listener).await;
        assert_eq!(next(&mut rx).await, "connected");
        assert_eq!(next(&mut rx).await, "connection-message");

        transport.send(TransportEvent::Data(json!({"data": {"tick": 1}})));
        transport.send(TransportEvent::Data(json!({"data": {"tick": 2}})));
        transport.send(TransportEvent::Complete);

        assert_eq!(next(&mut rx).await, r#"data {"data":{"tick":1}}"#);
        assert_eq!(next(&mut rx).await, r#"data {"data":{"tick":2}}"#);
        assert_eq!(next(&mut rx).await, "complete-message");
        assert_eq!(next(&mut rx).await, "on_complete");

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(transport.live(), 0);
        assert!(!manager.is_active(SubscriptionProtocol::Ws).await);
    }

    #[tokio::test]
    async fn test_transport_error_is_delivered_twice() {
        let transport = FakeTransport::new(SubscriptionProtocol::Sse);
        let manager = SubscriptionManager::new().with_transport(transport.clone());
        let (listener, mut rx) = recorder();

        let _handle = manager.subscribe(&options(SubscriptionProtocol::Sse), listener).await;
        assert_eq!(next(&mut rx).await, "connected");
        assert_eq!(next(&mut rx).await, "connection-message");

        transport.send(TransportEvent::Error("socket reset".to_string()));
        assert_eq!(next(&mut rx).await, r#"error-message "socket reset""#);
        assert_eq!(next(&mut rx).await, "on_error socket reset");
    }

    #[tokio::test]
    async fn test_second_subscribe_replaces_first() {
        let transport = FakeTransport::new(SubscriptionProtocol::Ws);
        let manager = SubscriptionManager::new().with_transport(transport.clone());

        let (first_listener, mut first) = recorder();
        let first_handle = manager.subscribe(&options(SubscriptionProtocol::Ws), first_listener).await;
        assert_eq!(next(&mut first).await, "connected");

        let (second_listener, mut second) = recorder();
        let _second_handle = manager.subscribe(&options(SubscriptionProtocol::Ws), second_listener).await;
        assert_eq!(next(&mut second).await, "connected");

        assert_eq!(transport.opened.load(Ordering::SeqCst), 2);
        assert_eq!(transport.live(), 1);

        // A stale handle must not close the replacement
        first_handle.unsubscribe().await;
        assert_eq!(transport.live(), 1);
        assert!(manager.is_active(SubscriptionProtocol::Ws).await);
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let transport = FakeTransport::new(SubscriptionProtocol::Ws);
        let manager = SubscriptionManager::new().with_transport(transport.clone());
        let (listener, mut rx) = recorder();

        let handle = manager.subscribe(&options(SubscriptionProtocol::Ws), listener).await;
        assert_eq!(next(&mut rx).await, "connected");
        assert!(manager.is_active(SubscriptionProtocol::Ws).await);

        handle.unsubscribe().await;
        assert_eq!(transport.live(), 0);
        handle.unsubscribe().await;
        assert_eq!(transport.live(), 0);
        assert!(!manager.is_active(SubscriptionProtocol::Ws).await);
    }

    #[tokio::test]
    async fn test_disconnect_all() {
        let ws = FakeTransport::new(SubscriptionProtocol::Ws);
        let sse = FakeTransport::new(SubscriptionProtocol::Sse);
        let manager = SubscriptionManager::new()
            .with_transport(ws.clone())
            .with_transport(sse.clone());

        let (l1, mut r1) = recorder();
        let (l2, mut r2) = recorder();
        let _h1 = manager.subscribe(&options(SubscriptionProtocol::Ws), l1).await;
        let _h2 = manager.subscribe(&options(SubscriptionProtocol::Sse), l2).await;
        assert_eq!(next(&mut r1).await, "connected");
        assert_eq!(next(&mut r2).await, "connected");

        manager.disconnect_all().await;
        manager.disconnect_all().await;
        assert_eq!(ws.live() + sse.live(), 0);
    }

    #[tokio::test]
    async fn test_connect_failure() {
        let transport = FakeTransport::failing(
            SubscriptionProtocol::AppSync,
            SubscriptionError::Unsupported("AppSync subscriptions are not supported yet".to_string()),
        );
        let manager = SubscriptionManager::new().with_transport(transport);
        let (listener, mut rx) = recorder();

        let _handle = manager.subscribe(&options(SubscriptionProtocol::AppSync), listener).await;
        assert_eq!(
            next(&mut rx).await,
            r#"error-message "AppSync subscriptions are not supported yet""#
        );
        assert_eq!(
            next(&mut rx).await,
            "on_error AppSync subscriptions are not supported yet"
        );
    }

    #[tokio::test]
    async fn test_missing_transport_and_bad_endpoint() {
        let manager = SubscriptionManager::new().with_transport(FakeTransport::new(SubscriptionProtocol::Ws));

        let (listener, mut rx) = recorder();
        let handle = manager.subscribe(&options(SubscriptionProtocol::Sse), listener).await;
        assert_eq!(next(&mut rx).await, r#"error-message "No transport for protocol sse""#);
        assert_eq!(next(&mut rx).await, "on_error No transport for protocol sse");
        handle.unsubscribe().await;

        let (listener, mut rx) = recorder();
        let bad = SubscriptionOptions::new("not a url", "subscription { a }", SubscriptionProtocol::Ws);
        let _handle = manager.subscribe(&bad, listener).await;
        assert_eq!(next(&mut rx).await, r#"error-message "Invalid endpoint URL""#);
    }
}
