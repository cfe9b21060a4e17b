//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod environment_repository;
mod http_client;
mod script_runner;
mod subscription_transport;

pub use environment_repository::{EnvironmentError, EnvironmentRepository};
pub use http_client::{
    HttpClient, HttpClientError, MultipartPart, OutboundBody, OutboundRequest, PartContent,
    RawResponse,
};
pub use script_runner::ScriptRunner;
pub use subscription_transport::{
    SubscriptionConnection, SubscriptionError, SubscriptionTransport, TransportEvent,
};
