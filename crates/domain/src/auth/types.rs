//! Authentication configuration types

use serde::{Deserialize, Serialize};

/// Authentication configuration for a request.
///
/// Exactly one mode is active; only that mode's payload exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication
    #[default]
    None,
    /// Bearer token authentication
    Bearer {
        /// The bearer token (may contain variables like `{{access_token}}`)
        token: String,
    },
    /// Basic authentication
    Basic {
        /// Username (may contain variables)
        username: String,
        /// Password (may contain variables)
        password: String,
    },
    /// API Key authentication
    ApiKey {
        /// Header or query parameter name
        key: String,
        /// The API key value
        value: String,
        /// Where to add the key
        #[serde(default, rename = "addTo", alias = "add_to")]
        add_to: ApiKeyLocation,
    },
}

/// Location for API key authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyLocation {
    /// Add to request headers
    #[default]
    Header,
    /// Add to query parameters
    Query,
}

impl AuthConfig {
    /// Returns true if authentication is configured.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Creates a bearer token authentication.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates a basic authentication.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates an API key authentication in header.
    #[must_use]
    pub fn api_key_header(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            value: value.into(),
            add_to: ApiKeyLocation::Header,
        }
    }

    /// Creates an API key authentication in the query string.
    #[must_use]
    pub fn api_key_query(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            value: value.into(),
            add_to: ApiKeyLocation::Query,
        }
    }

    /// Returns the query parameter for query-located API keys.
    #[must_use]
    pub fn query_param(&self) -> Option<(&str, &str)> {
        match self {
            Self::ApiKey {
                key,
                value,
                add_to: ApiKeyLocation::Query,
            } if !key.is_empty() => Some((key, value)),
            _ => None,
        }
    }

    /// Applies `f` to every string field, keeping the mode and structure.
    #[must_use]
    pub fn map_strings(&self, mut f: impl FnMut(&str) -> String) -> Self {
        match self {
            Self::None => Self::None,
            Self::Bearer { token } => Self::Bearer { token: f(token) },
            Self::Basic { username, password } => Self::Basic {
                username: f(username),
                password: f(password),
            },
            Self::ApiKey { key, value, add_to } => Self::ApiKey {
                key: f(key),
                value: f(value),
                add_to: *add_to,
            },
        }
    }

    /// Returns every string field, in declaration order.
    #[must_use]
    pub fn strings(&self) -> Vec<&str> {
        match self {
            Self::None => Vec::new(),
            Self::Bearer { token } => vec![token],
            Self::Basic { username, password } => vec![username, password],
            Self::ApiKey { key, value, .. } => vec![key, value],
        }
    }
}
