//! GraphIt Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the reqwest HTTP client, the
//! WebSocket/SSE subscription transports, the Rhai script sandbox and
//! JSON file persistence.

pub mod adapters;
pub mod http;
pub mod logging;
pub mod persistence;
pub mod scripting;
pub mod serialization;
pub mod subscriptions;

pub use adapters::ReqwestHttpClient;
pub use http::build_form;
pub use persistence::{JsonEnvironmentRepository, SettingsError, SettingsRepository};
pub use scripting::{RhaiSandbox, SandboxLimits};
pub use serialization::{
    SerializationError, from_json, from_json_bytes, to_json_stable,
};
pub use subscriptions::{
    AppSyncTransport, SseTransport, WsTransport, default_manager, http_to_ws_url,
};
