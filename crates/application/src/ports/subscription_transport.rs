//! Subscription transport port

use async_trait::async_trait;
use graphit_domain::{SubscriptionProtocol, SubscriptionRequest};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while opening or running a subscription.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The endpoint could not be resolved to a valid URL.
    #[error("Invalid endpoint URL")]
    InvalidEndpoint,

    /// The variables text is not valid JSON.
    #[error("Invalid variables JSON: {0}")]
    InvalidVariables(String),

    /// The protocol has no working transport.
    #[error("{0}")]
    Unsupported(String),

    /// The handshake did not finish in time.
    #[error("Connection timed out after {timeout_ms}ms")]
    Timeout {
        /// Handshake deadline.
        timeout_ms: u64,
    },

    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The server violated the protocol.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// An event read from a live connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A result payload (`{data, errors}`).
    Data(Value),
    /// A transport or operation error. Ends the stream.
    Error(String),
    /// The server completed the operation.
    Complete,
}

/// A live subscription connection.
#[async_trait]
pub trait SubscriptionConnection: Send {
    /// Waits for the next event; `None` once the stream has ended.
    async fn next_event(&mut self) -> Option<TransportEvent>;

    /// Closes the underlying socket or stream. Safe to call more than once.
    async fn close(&mut self);
}

/// Port for establishing subscriptions over one protocol.
#[async_trait]
pub trait SubscriptionTransport: Send + Sync {
    /// The protocol this transport speaks.
    fn protocol(&self) -> SubscriptionProtocol;

    /// Opens a connection and starts the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the handshake or the subscribe step fails.
    async fn connect(
        &self,
        request: &SubscriptionRequest,
    ) -> Result<Box<dyn SubscriptionConnection>, SubscriptionError>;
}
