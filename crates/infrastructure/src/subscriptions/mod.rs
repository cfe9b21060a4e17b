//! Subscription transports.
//!
//! Each transport opens one connection per subscription and reports events
//! through the `SubscriptionConnection` port.

mod appsync;
mod sse;
mod websocket;

use std::sync::Arc;

use graphit_application::SubscriptionManager;
use graphit_domain::ClientSettings;

pub use appsync::{APPSYNC_UNSUPPORTED, AppSyncTransport};
pub use sse::SseTransport;
pub use websocket::{GRAPHQL_TRANSPORT_WS, WsTransport, http_to_ws_url};

/// Builds a manager with every transport registered.
#[must_use]
pub fn default_manager(client: reqwest::Client, settings: &ClientSettings) -> SubscriptionManager {
    SubscriptionManager::new()
        .with_transport(Arc::new(WsTransport::with_settings(settings)))
        .with_transport(Arc::new(SseTransport::with_settings(client, settings)))
        .with_transport(Arc::new(AppSyncTransport))
}
