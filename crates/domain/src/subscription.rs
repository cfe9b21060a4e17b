//! Subscription types.
//!
//! Every transport normalizes its events into [`SubscriptionMessage`] values,
//! so consumers never see WebSocket, SSE or AppSync specifics.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::DomainError;

/// Transport used for a live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionProtocol {
    /// GraphQL over WebSocket (`graphql-transport-ws`).
    #[default]
    Ws,
    /// GraphQL over Server-Sent Events.
    Sse,
    /// AWS AppSync realtime.
    #[serde(rename = "appsync")]
    AppSync,
}

impl SubscriptionProtocol {
    /// All protocols.
    pub const ALL: [Self; 3] = [Self::Ws, Self::Sse, Self::AppSync];

    /// Returns the protocol identifier.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ws => "ws",
            Self::Sse => "sse",
            Self::AppSync => "appsync",
        }
    }
}

impl fmt::Display for SubscriptionProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionProtocol {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ws" | "websocket" => Ok(Self::Ws),
            "sse" => Ok(Self::Sse),
            "appsync" => Ok(Self::AppSync),
            _ => Err(DomainError::UnsupportedProtocol(s.to_string())),
        }
    }
}

/// Kind of a normalized subscription message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionMessageType {
    /// A payload frame from the server.
    Data,
    /// A transport or protocol error.
    Error,
    /// The server completed the stream.
    Complete,
    /// Marker emitted once the connection is established.
    Connection,
}

/// The normalized unit emitted by every transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionMessage {
    /// Unique message ID.
    pub id: String,
    /// Message kind.
    #[serde(rename = "type")]
    pub message_type: SubscriptionMessageType,
    /// Message payload.
    pub payload: Value,
    /// When the message was produced.
    pub timestamp: DateTime<Utc>,
}

impl SubscriptionMessage {
    fn with(message_type: SubscriptionMessageType, payload: Value) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            message_type,
            payload,
            timestamp: Utc::now(),
        }
    }

    /// A data frame.
    #[must_use]
    pub fn data(payload: Value) -> Self {
        Self::with(SubscriptionMessageType::Data, payload)
    }

    /// An error entry carrying `{"message": ...}`.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        let message: String = message.into();
        Self::with(
            SubscriptionMessageType::Error,
            serde_json::json!({ "message": message }),
        )
    }

    /// A completion marker.
    #[must_use]
    pub fn complete() -> Self {
        Self::with(SubscriptionMessageType::Complete, Value::Null)
    }

    /// A connection marker for the given protocol.
    #[must_use]
    pub fn connection(protocol: SubscriptionProtocol) -> Self {
        Self::with(
            SubscriptionMessageType::Connection,
            serde_json::json!({ "status": "connected", "protocol": protocol.as_str() }),
        )
    }
}

/// Lifecycle of one subscription connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    /// Not started.
    #[default]
    Idle,
    /// Handshake in progress.
    Connecting,
    /// Connected, waiting for or receiving events.
    Connected,
    /// The server completed the stream.
    Completed,
    /// The connection failed.
    Errored,
    /// The caller unsubscribed.
    Closed,
}

impl SubscriptionState {
    /// Returns true for terminal states.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Errored | Self::Closed)
    }

    /// Get a human-readable status string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Connecting => "Connecting...",
            Self::Connected => "Connected",
            Self::Completed => "Completed",
            Self::Errored => "Error",
            Self::Closed => "Closed",
        }
    }
}

/// A fully resolved subscription handed to a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    /// Resolved endpoint URL (`http(s)://`).
    pub url: String,
    /// GraphQL document.
    pub query: String,
    /// Parsed variables, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Map<String, Value>>,
    /// Selected operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Resolved headers, auth header included.
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    /// Transport protocol.
    pub protocol: SubscriptionProtocol,
}

impl SubscriptionRequest {
    /// The `{query, variables, operationName}` payload.
    #[must_use]
    pub fn payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("query".to_string(), Value::String(self.query.clone()));
        if let Some(variables) = &self.variables {
            payload.insert("variables".to_string(), Value::Object(variables.clone()));
        }
        if let Some(name) = &self.operation_name {
            payload.insert("operationName".to_string(), Value::String(name.clone()));
        }
        Value::Object(payload)
    }

    /// Headers as a JSON object, used as connection parameters.
    #[must_use]
    pub fn headers_object(&self) -> Map<String, Value> {
        self.headers
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }
}
