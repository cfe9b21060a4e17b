//! GraphQL response payload types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Message used when a response body is not valid JSON.
pub const PARSE_FAILURE_MESSAGE: &str = "Failed to parse response as JSON";

/// A GraphQL response as returned by the endpoint.
///
/// GraphQL-level errors are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    /// The `data` member, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// The `errors` member, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQLError>>,
    /// The `extensions` member, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// A single entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLError {
    /// Human-readable message.
    #[serde(default)]
    pub message: String,
    /// Source locations in the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<ErrorLocation>>,
    /// Response path of the failing field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<Value>>,
    /// Implementation-specific extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

/// A line/column location in a GraphQL document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorLocation {
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

impl GraphQLError {
    /// Creates an error with only a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

impl GraphQLResponse {
    /// Synthetic response used when the body could not be parsed as JSON.
    #[must_use]
    pub fn parse_failure() -> Self {
        Self {
            data: None,
            errors: Some(vec![GraphQLError::new(PARSE_FAILURE_MESSAGE)]),
            extensions: None,
        }
    }

    /// Parses a response body.
    ///
    /// Invalid JSON degrades to [`GraphQLResponse::parse_failure`]. Valid JSON
    /// that is not a response object is kept whole under `data`.
    #[must_use]
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_value(value),
            Err(_) => Self::parse_failure(),
        }
    }

    /// Converts an already-parsed JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) if is_response_shaped(&map) => {
                let value = Value::Object(map);
                serde_json::from_value(value.clone()).unwrap_or(Self {
                    data: Some(value),
                    errors: None,
                    extensions: None,
                })
            }
            other => Self {
                data: Some(other),
                errors: None,
                extensions: None,
            },
        }
    }

    /// Returns true if the `errors` array is present and non-empty.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Returns this response as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

fn is_response_shaped(map: &Map<String, Value>) -> bool {
    map.contains_key("data") || map.contains_key("errors") || map.contains_key("extensions")
}
