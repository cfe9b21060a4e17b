//! GraphIt Domain - Core client types
//!
//! This crate defines the domain model for the GraphIt client core.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod environment;
pub mod error;
pub mod id;
pub mod request;
pub mod response;
pub mod schema;
pub mod scripting;
pub mod settings;
pub mod subscription;

pub use auth::{ApiKeyLocation, AuthConfig};
pub use environment::{Environment, InterpolationContext, Variable};
pub use error::{DomainError, DomainResult};
pub use id::generate_id;
pub use request::{
    FileHandle, FileMapping, Header, HttpMethod, RequestOptions, ResponseHeader,
    SubscriptionOptions,
};
pub use response::{GraphQLError, GraphQLResponse, RequestResult, RequestStats};
pub use schema::{IntrospectionSchema, SchemaType, TypeRef};
pub use scripting::{
    DEFAULT_SCRIPT_TIMEOUT_MS, RequestScripts, SCRIPT_TIMEOUT_MESSAGE, Script, ScriptKind,
    ScriptResult, ScriptTask,
};
pub use settings::ClientSettings;
pub use subscription::{
    SubscriptionMessage, SubscriptionMessageType, SubscriptionProtocol, SubscriptionRequest,
    SubscriptionState,
};
