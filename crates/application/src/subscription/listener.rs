//! Subscription callbacks

use graphit_domain::SubscriptionMessage;

/// Receives the events of one subscription.
///
/// Every callback defaults to a no-op. Messages arrive in transport order.
pub trait SubscriptionListener: Send + Sync {
    /// Called for every normalized message, errors included.
    fn on_message(&self, _message: &SubscriptionMessage) {}

    /// Called once the connection is established.
    fn on_connected(&self) {}

    /// Called when the connection fails.
    fn on_error(&self, _error: &str) {}

    /// Called when the server completes the stream.
    fn on_complete(&self) {}
}
