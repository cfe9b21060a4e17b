//! Request header types

use serde::{Deserialize, Serialize};

use crate::id::generate_id;

/// A single request header as edited by the user.
///
/// Disabled headers stay in the list so they can be toggled back on, but they
/// never reach the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Stable identifier for list editing.
    #[serde(default = "generate_id")]
    pub id: String,
    /// The header name (e.g., "X-Request-Id").
    pub key: String,
    /// The header value, may contain `{{variables}}`.
    pub value: String,
    /// Whether this header participates in requests.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl Header {
    /// Creates a new enabled header.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a new disabled header.
    #[must_use]
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }

    /// Returns true if the header is enabled and has a non-blank name.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && !self.key.trim().is_empty()
    }
}

/// A response header, kept in arrival order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseHeader {
    /// Header name as received.
    pub key: String,
    /// Header value.
    pub value: String,
}

impl ResponseHeader {
    /// Creates a response header entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_header_new_is_enabled() {
        let header = Header::new("X-Trace", "1");
        assert!(header.enabled);
        assert!(header.is_active());
        assert_eq!(header.id.len(), 36);
    }

    #[test]
    fn test_disabled_header_is_inactive() {
        let header = Header::disabled("X-Trace", "1");
        assert!(!header.is_active());
    }

    #[test]
    fn test_blank_key_is_inactive() {
        let header = Header::new("  ", "value");
        assert!(!header.is_active());
    }

    #[test]
    fn test_header_deserialize_defaults() {
        let header: Header = serde_json::from_str(r#"{"key":"A","value":"b"}"#).unwrap();
        assert!(header.enabled);
        assert!(!header.id.is_empty());
    }
}
