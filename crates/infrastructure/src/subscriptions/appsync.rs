//! AppSync placeholder transport.

use async_trait::async_trait;
use graphit_application::ports::{SubscriptionConnection, SubscriptionError, SubscriptionTransport};
use graphit_domain::{SubscriptionProtocol, SubscriptionRequest};

/// Error reported for every AppSync subscription.
pub const APPSYNC_UNSUPPORTED: &str = "AppSync subscriptions are not supported yet";

/// Transport that accepts the AppSync protocol but never opens a socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppSyncTransport;

#[async_trait]
impl SubscriptionTransport for AppSyncTransport {
    fn protocol(&self) -> SubscriptionProtocol {
        SubscriptionProtocol::AppSync
    }

    async fn connect(
        &self,
        _request: &SubscriptionRequest,
    ) -> Result<Box<dyn SubscriptionConnection>, SubscriptionError> {
        Err(SubscriptionError::Unsupported(APPSYNC_UNSUPPORTED.to_string()))
    }
}
