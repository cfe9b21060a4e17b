//! Subscription management.
//!
//! [`SubscriptionManager`] owns at most one live connection per protocol and
//! turns transport events into [`graphit_domain::SubscriptionMessage`]s.

mod listener;
mod manager;
mod resolve;

pub use listener::SubscriptionListener;
pub use manager::{SubscriptionHandle, SubscriptionManager};
pub use resolve::resolve_subscription;
